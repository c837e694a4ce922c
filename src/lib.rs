pub mod raptor;
pub mod repository;
pub mod shared;

pub mod prelude {
    pub use crate::raptor::{
        AccessEgress, Allocator, CancellationToken, Config, Itinerary, Profile, Raptor, Response,
        SearchStatus,
    };
    pub use crate::repository::{Repository, RepositoryBuilder, VehicleType};
    pub use crate::shared::{Duration, Time};
}
