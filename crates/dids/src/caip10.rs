use std::{fmt, str::FromStr};

const NAMESPACE_MIN_LENGTH: usize = 3;
const NAMESPACE_MAX_LENGTH: usize = 8;
const REFERENCE_MAX_LENGTH: usize = 32;
const ADDRESS_MAX_LENGTH: usize = 128;

/// <https://github.com/ChainAgnostic/CAIPs/blob/master/CAIPs/caip-2.md>
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ChainId {
    pub namespace: String,
    pub reference: String,
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

/// <https://github.com/ChainAgnostic/CAIPs/blob/master/CAIPs/caip-10.md>
///
/// Both the current `namespace:reference:address` syntax and the legacy
/// `address@namespace:reference` syntax are accepted.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct BlockchainAccountId {
    pub account_address: String,
    pub chain_id: ChainId,
}

impl BlockchainAccountId {
    /// Numeric chain id, for `eip155` accounts.
    pub fn eip155_chain_id(&self) -> Option<u64> {
        if self.chain_id.namespace != "eip155" {
            return None;
        }
        self.chain_id.reference.parse().ok()
    }
}

impl fmt::Display for BlockchainAccountId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.chain_id, self.account_address)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BlockchainAccountIdParseError {
    #[error("Unexpected character in namespace: {0}")]
    NamespaceChar(char),
    #[error("Namespace bad length: {0}")]
    NamespaceLength(usize),
    #[error("Unexpected character in reference: {0}")]
    ReferenceChar(char),
    #[error("Reference bad length: {0}")]
    ReferenceLength(usize),
    #[error("Unexpected character in account address: {0}")]
    AddressChar(char),
    #[error("Account address bad length: {0}")]
    AddressLength(usize),
    #[error("Missing separator")]
    MissingSeparator,
}

impl FromStr for ChainId {
    type Err = BlockchainAccountIdParseError;

    fn from_str(chain_id: &str) -> Result<Self, Self::Err> {
        let (namespace, reference) = chain_id
            .split_once(':')
            .ok_or(BlockchainAccountIdParseError::MissingSeparator)?;
        // namespace:   [-a-z0-9]{3,8}
        if let Some(c) = namespace
            .chars()
            .find(|c| !matches!(c, '-' | 'a'..='z' | '0'..='9'))
        {
            return Err(BlockchainAccountIdParseError::NamespaceChar(c));
        }
        if !(NAMESPACE_MIN_LENGTH..=NAMESPACE_MAX_LENGTH).contains(&namespace.len()) {
            return Err(BlockchainAccountIdParseError::NamespaceLength(
                namespace.len(),
            ));
        }
        // reference:   [-a-zA-Z0-9]{1,32}
        if let Some(c) = reference
            .chars()
            .find(|c| !matches!(c, '-' | 'a'..='z' | 'A'..='Z' | '0'..='9'))
        {
            return Err(BlockchainAccountIdParseError::ReferenceChar(c));
        }
        if !(1..=REFERENCE_MAX_LENGTH).contains(&reference.len()) {
            return Err(BlockchainAccountIdParseError::ReferenceLength(
                reference.len(),
            ));
        }
        Ok(Self {
            namespace: namespace.to_owned(),
            reference: reference.to_owned(),
        })
    }
}

fn parse_address(address: &str) -> Result<String, BlockchainAccountIdParseError> {
    // address:     [-.%a-zA-Z0-9]{1,128}
    if let Some(c) = address
        .chars()
        .find(|c| !matches!(c, '-' | '.' | '%' | 'a'..='z' | 'A'..='Z' | '0'..='9'))
    {
        return Err(BlockchainAccountIdParseError::AddressChar(c));
    }
    if !(1..=ADDRESS_MAX_LENGTH).contains(&address.len()) {
        return Err(BlockchainAccountIdParseError::AddressLength(address.len()));
    }
    Ok(address.to_owned())
}

impl FromStr for BlockchainAccountId {
    type Err = BlockchainAccountIdParseError;

    fn from_str(account_id: &str) -> Result<Self, Self::Err> {
        let (chain_id, account_address) = match account_id.split_once('@') {
            // Legacy syntax.
            Some((address, chain_id)) => (chain_id, address),
            None => account_id
                .rsplit_once(':')
                .ok_or(BlockchainAccountIdParseError::MissingSeparator)?,
        };
        Ok(Self {
            account_address: parse_address(account_address)?,
            chain_id: chain_id.parse()?,
        })
    }
}
