//! Addresses and command responses exchanged between members.

mod address;
mod responses;

pub use address::{
    NodeAddress, NodeAddressExternalizer, TopologyAwareAddress, TopologyAwareAddressExternalizer,
};
pub use responses::{
    CacheNotFoundResponse, ExceptionResponse, ExceptionResponseExternalizer,
    StatelessResponseExternalizer, SuccessfulResponse, SuccessfulResponseExternalizer,
    UnsuccessfulResponse, UnsureResponse,
};
