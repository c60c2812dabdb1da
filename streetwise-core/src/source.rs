//! Collaborators the pipeline calls out to.
//!
//! The pipeline never performs I/O itself. It sends queries through a
//! [`RoadNetworkSource`] and obtains boundaries through a
//! [`BoundarySource`]; HTTP and on-disk implementations live elsewhere.

use crate::boundary::Boundary;
use crate::element::RawElement;
use crate::error::{BoundaryError, QueryServiceError};
use crate::query::OverpassQuery;

/// Run a road-network query and return the raw elements.
///
/// Implementations block until the response arrives and are responsible for
/// any retrying.
///
/// # Examples
///
/// ```
/// use streetwise_core::{OverpassQuery, QueryServiceError, RawElement, RoadNetworkSource};
///
/// struct Empty;
///
/// impl RoadNetworkSource for Empty {
///     fn fetch_elements(&self, _query: &OverpassQuery) -> Result<Vec<RawElement>, QueryServiceError> {
///         Ok(Vec::new())
///     }
/// }
///
/// let query = streetwise_core::query_for_bbox(streetwise_core::BoundingBox::new(0.0, 0.0, 1.0, 1.0));
/// assert!(Empty.fetch_elements(&query)?.is_empty());
/// # Ok::<(), QueryServiceError>(())
/// ```
pub trait RoadNetworkSource {
    /// Execute `query` and decode the response's elements.
    fn fetch_elements(&self, query: &OverpassQuery) -> Result<Vec<RawElement>, QueryServiceError>;
}

/// Obtain the administrative boundary of a city.
pub trait BoundarySource {
    /// Fetch the boundary for `city` in `state` of `country`.
    fn boundary(&self, city: &str, state: &str, country: &str) -> Result<Boundary, BoundaryError>;
}

impl<T: RoadNetworkSource + ?Sized> RoadNetworkSource for &T {
    fn fetch_elements(&self, query: &OverpassQuery) -> Result<Vec<RawElement>, QueryServiceError> {
        (**self).fetch_elements(query)
    }
}

impl<T: BoundarySource + ?Sized> BoundarySource for &T {
    fn boundary(&self, city: &str, state: &str, country: &str) -> Result<Boundary, BoundaryError> {
        (**self).boundary(city, state, country)
    }
}
