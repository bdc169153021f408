//! Static schema registries for both API generations.
//!
//! [`plaza`] describes the XML documents of the Plaza API, [`retailer`] the JSON documents of
//! the Retailer API. Both feed the same mapper.

pub mod plaza;
pub mod retailer;
