#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod handler;
pub mod service;

pub use crate::handler::routes;
pub use crate::service::{ServiceConfig, ServiceState};
