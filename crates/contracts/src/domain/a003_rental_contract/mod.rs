pub mod aggregate;

pub use aggregate::{
    ContractListResponse, ContractStatus, RentalContract, RentalContractDto, RentalContractId,
};
