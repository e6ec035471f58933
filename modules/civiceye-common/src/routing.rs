//! Authority routing table.
//!
//! Pure mapping from issue category to the municipal department that owns
//! it. Consumed by the excluded complaint-templating and dispatch layers;
//! the pipeline only logs it.

use crate::types::IssueCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authority {
    /// Department the complaint is routed to.
    pub department: &'static str,
    /// Human-readable issue label for generated complaint letters.
    pub issue_display_name: &'static str,
}

/// Total over `IssueCategory`; `Other` routes to general administration.
pub fn authority_for(category: IssueCategory) -> Authority {
    match category {
        IssueCategory::Pothole => Authority {
            department: "Roads and Infrastructure Department",
            issue_display_name: "Road Damage / Pothole",
        },
        IssueCategory::Garbage => Authority {
            department: "Sanitation and Waste Management Department",
            issue_display_name: "Waste Management / Garbage Disposal",
        },
        IssueCategory::Streetlight => Authority {
            department: "Electrical and Public Lighting Department",
            issue_display_name: "Street Lighting Issue",
        },
        IssueCategory::Waterlogging => Authority {
            department: "Water Supply and Drainage Department",
            issue_display_name: "Water Logging / Drainage Problem",
        },
        IssueCategory::Other => Authority {
            department: "Municipal Administration",
            issue_display_name: "General Civic Issue",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_an_authority() {
        for category in IssueCategory::ALL {
            let authority = authority_for(category);
            assert!(!authority.department.is_empty());
            assert!(!authority.issue_display_name.is_empty());
        }
    }

    #[test]
    fn fallback_routes_to_general_administration() {
        assert_eq!(
            authority_for(IssueCategory::Other).department,
            "Municipal Administration"
        );
    }
}
