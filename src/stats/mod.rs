mod aggregate;
mod sites;

pub use aggregate::{aggregate, AggregateParams, AggregateStats};
pub use sites::analyse_sites;
