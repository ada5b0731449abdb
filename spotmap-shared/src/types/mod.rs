mod contribution;
mod ids;
mod sport_type;
mod spot;
mod user;
mod valuation;

pub use contribution::Contribution;
pub use ids::{SpotId, UserId, ValuationId};
pub use sport_type::SportType;
pub use spot::{Spot, SpotStatus};
pub use user::User;
pub use valuation::Valuation;
