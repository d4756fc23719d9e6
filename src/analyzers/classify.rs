use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::CategoryRule;

/// Closed set of inquiry categories, in default priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InquiryCategory {
    #[serde(rename = "Purchase Inquiry")]
    PurchaseInquiry,
    #[serde(rename = "Business Partnership")]
    BusinessPartnership,
    #[serde(rename = "Job/Internship")]
    JobInternship,
    #[serde(rename = "Investment/Funding")]
    InvestmentFunding,
    #[serde(rename = "Technical Support")]
    TechnicalSupport,
    #[serde(rename = "Fleet Management")]
    FleetManagement,
    #[serde(rename = "Others")]
    Others,
}

impl InquiryCategory {
    pub const ALL: [InquiryCategory; 7] = [
        InquiryCategory::PurchaseInquiry,
        InquiryCategory::BusinessPartnership,
        InquiryCategory::JobInternship,
        InquiryCategory::InvestmentFunding,
        InquiryCategory::TechnicalSupport,
        InquiryCategory::FleetManagement,
        InquiryCategory::Others,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InquiryCategory::PurchaseInquiry => "Purchase Inquiry",
            InquiryCategory::BusinessPartnership => "Business Partnership",
            InquiryCategory::JobInternship => "Job/Internship",
            InquiryCategory::InvestmentFunding => "Investment/Funding",
            InquiryCategory::TechnicalSupport => "Technical Support",
            InquiryCategory::FleetManagement => "Fleet Management",
            InquiryCategory::Others => "Others",
        }
    }
}

impl fmt::Display for InquiryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns the first category in `rules` with a keyword contained in
/// `query` (case-insensitive), or [`InquiryCategory::Others`].
pub fn classify(query: &str, rules: &[CategoryRule]) -> InquiryCategory {
    let query = query.to_lowercase();
    rules
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|k| !k.is_empty() && query.contains(&k.to_lowercase()))
        })
        .map(|rule| rule.category)
        .unwrap_or(InquiryCategory::Others)
}
