//! Contract categories and prompt keyword classification

use serde::{Deserialize, Serialize};

/// The artifact category a prompt maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractCategory {
    /// Non-fungible collectible assets (NFT-style)
    Collectible,
    /// Fungible value tokens (ERC-20-style)
    Fungible,
    /// Proposal/voting governance
    Governance,
    /// Listing and escrowed trading
    Marketplace,
    /// Plain storage contract when nothing else matches
    Generic,
}

impl ContractCategory {
    /// Classifies a prompt by keyword heuristics
    ///
    /// First match wins in the order collectible, governance, marketplace,
    /// fungible; "token" alone is too generic to outrank the others.
    pub fn classify(prompt: &str) -> Self {
        let prompt = prompt.to_lowercase();
        let matches_any = |keywords: &[&str]| keywords.iter().any(|k| prompt.contains(k));

        if matches_any(&["nft", "collectible", "721", "art", "unique asset"]) {
            ContractCategory::Collectible
        } else if matches_any(&["governance", "voting", "vote", "dao", "proposal"]) {
            ContractCategory::Governance
        } else if matches_any(&["marketplace", "market", "auction", "escrow", "listing", "sale"]) {
            ContractCategory::Marketplace
        } else if matches_any(&["token", "coin", "currency", "erc20", "fungible", "stablecoin"]) {
            ContractCategory::Fungible
        } else {
            ContractCategory::Generic
        }
    }

    /// Stable lowercase name, used in cache keys and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractCategory::Collectible => "collectible",
            ContractCategory::Fungible => "fungible",
            ContractCategory::Governance => "governance",
            ContractCategory::Marketplace => "marketplace",
            ContractCategory::Generic => "generic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_collectible() {
        assert_eq!(
            ContractCategory::classify("An NFT collection for digital art"),
            ContractCategory::Collectible
        );
    }

    #[test]
    fn test_classify_fungible() {
        assert_eq!(
            ContractCategory::classify("A simple ERC20 token with minting"),
            ContractCategory::Fungible
        );
    }

    #[test]
    fn test_classify_governance() {
        assert_eq!(
            ContractCategory::classify("DAO voting with proposals"),
            ContractCategory::Governance
        );
    }

    #[test]
    fn test_classify_marketplace() {
        assert_eq!(
            ContractCategory::classify("auction house with escrow"),
            ContractCategory::Marketplace
        );
    }

    #[test]
    fn test_classify_generic() {
        assert_eq!(
            ContractCategory::classify("store a number on chain"),
            ContractCategory::Generic
        );
    }

    #[test]
    fn test_governance_token_prefers_governance() {
        assert_eq!(
            ContractCategory::classify("a governance token"),
            ContractCategory::Governance
        );
    }
}
