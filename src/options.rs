use serde::{Deserialize, Serialize};

/// Default proof purpose of issued proofs.
pub const DEFAULT_PROOF_PURPOSE: &str = "assertionMethod";

/// Kind of document being issued or verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProofRole {
    Credential,
    Presentation,
}

impl ProofRole {
    /// Canonical name of the role.
    ///
    /// Used as the mandatory document type, the EIP-712 primary type and the
    /// EIP-712 domain name.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Self::Credential => "VerifiableCredential",
            Self::Presentation => "VerifiablePresentation",
        }
    }

    /// Name of the property identifying the signer.
    pub fn signer_property(&self) -> &'static str {
        match self {
            Self::Credential => "issuer",
            Self::Presentation => "holder",
        }
    }
}

/// Issuance options.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueOptions {
    /// Key to sign with. When absent, the first key of the signer supporting
    /// EIP-712 signatures is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ref: Option<String>,

    /// Proof purpose, defaults to [`DEFAULT_PROOF_PURPOSE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,
}

impl IssueOptions {
    pub fn with_key_ref(key_ref: impl Into<String>) -> Self {
        Self {
            key_ref: Some(key_ref.into()),
            ..Default::default()
        }
    }

    pub fn proof_purpose(&self) -> &str {
        self.proof_purpose
            .as_deref()
            .unwrap_or(DEFAULT_PROOF_PURPOSE)
    }
}

/// Verification options.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOptions {}
