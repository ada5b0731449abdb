/// Identifier of a spot document, assigned by the store on creation.
pub type SpotId = String;

/// Identifier of a user, tied to the authentication identity.
pub type UserId = String;

/// Identifier of a valuation document.
pub type ValuationId = String;
