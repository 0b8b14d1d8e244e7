//! Contract call parameter builder.
//!
//! Accumulates `(type, name, value)` triples and renders them into the
//! parameter list of a function signature plus the positional argument list
//! for ABI encoding. Both renderings are derived from the current contents on
//! every call.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256};

use crate::codec::AccountId;

/// One typed, named contract call argument.
#[derive(Debug, Clone, PartialEq)]
pub struct CallParameter {
    /// Argument name, as it appears in the signature.
    pub name: String,
    /// Solidity type tag (e.g. `"address"`, `"uint256"`).
    pub solidity_type: String,
    /// Argument value.
    pub value: DynSolValue,
}

/// Append-only, ordered contract call parameter builder.
///
/// ```rust,ignore
/// let params = ContractFunctionParameterBuilder::new()
///     .add_param("address", "recipient", DynSolValue::Address(to))
///     .add_param("uint256", "amount", DynSolValue::Uint(U256::from(10), 256));
/// assert_eq!(params.build_abi_function_params(), "address recipient,uint256 amount");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractFunctionParameterBuilder {
    params: Vec<CallParameter>,
}

impl ContractFunctionParameterBuilder {
    /// Create an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Append a parameter. Values are stored as given.
    #[must_use]
    pub fn add_param(
        mut self,
        solidity_type: impl Into<String>,
        name: impl Into<String>,
        value: DynSolValue,
    ) -> Self {
        self.params.push(CallParameter {
            name: name.into(),
            solidity_type: solidity_type.into(),
            value,
        });
        self
    }

    /// Append an `address` parameter from a native account id.
    #[must_use]
    pub fn add_account(self, name: impl Into<String>, account: &AccountId) -> Self {
        self.add_address(name, account.to_solidity_address())
    }

    /// Append an `address` parameter.
    #[must_use]
    pub fn add_address(self, name: impl Into<String>, address: Address) -> Self {
        self.add_param("address", name, DynSolValue::Address(address))
    }

    /// Append a `uint256` parameter.
    #[must_use]
    pub fn add_uint256(self, name: impl Into<String>, value: u64) -> Self {
        self.add_param("uint256", name, DynSolValue::Uint(U256::from(value), 256))
    }

    /// `"type1 name1,type2 name2,..."` in insertion order.
    #[must_use]
    pub fn build_abi_function_params(&self) -> String {
        self.params
            .iter()
            .map(|p| format!("{} {}", p.solidity_type, p.name))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Positional argument values in insertion order.
    #[must_use]
    pub fn build_arguments(&self) -> Vec<DynSolValue> {
        self.params.iter().map(|p| p.value.clone()).collect()
    }

    /// The accumulated parameters.
    #[must_use]
    pub fn params(&self) -> &[CallParameter] {
        &self.params
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
