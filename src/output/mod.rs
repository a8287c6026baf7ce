pub mod csv;
pub mod json;
pub mod table;

use crate::records::{ProjectRecord, TalentListOption, TalentRecord};

/// Records that render as one row of a displayed or exported table.
pub trait Tabular {
    /// Column headers, in display order.
    fn headers() -> &'static [&'static str];

    /// Cell values in the same order as [`Tabular::headers`].
    fn cells(&self) -> Vec<&str>;
}

impl Tabular for ProjectRecord {
    fn headers() -> &'static [&'static str] {
        &[
            "Project ID",
            "Project",
            "Product",
            "Genre",
            "Contact",
            "Budget",
            "Created",
            "Modified",
        ]
    }

    fn cells(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.name.as_str(),
            self.product_name.as_str(),
            self.genre_name.as_str(),
            self.contact_person.as_str(),
            self.budget.as_str(),
            self.created.as_str(),
            self.modified.as_str(),
        ]
    }
}

impl Tabular for TalentListOption {
    fn headers() -> &'static [&'static str] {
        &["List ID", "List"]
    }

    fn cells(&self) -> Vec<&str> {
        vec![self.id.as_str(), self.name.as_str()]
    }
}

impl Tabular for TalentRecord {
    fn headers() -> &'static [&'static str] {
        &[
            "Talent",
            "Age",
            "Group",
            "Negotiation",
            "List Price",
            "List Memo",
            "Hobby",
            "Skill",
            "Biography",
            "Fee Range",
            "Talent Memo",
            "Sort No",
            "Listed On",
        ]
    }

    fn cells(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.age.as_str(),
            self.group_name.as_str(),
            self.negotiation_status.as_str(),
            self.list_price.as_str(),
            self.list_memo.as_str(),
            self.hobby.as_str(),
            self.skill.as_str(),
            self.biography.as_str(),
            self.fee_range.as_str(),
            self.talent_memo.as_str(),
            self.sort_order.as_str(),
            self.listed_on.as_str(),
        ]
    }
}
