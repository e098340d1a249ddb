//! Services that sit between the API client and consumers.

pub mod dashboard;
