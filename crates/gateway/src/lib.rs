#![forbid(unsafe_code)]

pub mod contract;
pub mod http;

pub use contract::{
    GatewayError, InMemoryGateway, ResultService, Submission, SubmissionReceipt,
    TestContentService, TestPaper,
};
pub use http::{GatewayConfig, HttpGateway};
