//! HTTP front end for [`tscompute`].

pub mod api;
pub mod http;
