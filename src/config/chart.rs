use charts::{GroupBy, SortBy, SortOrder, SortingOptions};
use serde::Deserialize;

fn colors() -> Vec<String> {
    charts::default_colors()
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Chart {
    #[serde(default = "colors")]
    colors: Vec<String>,
    #[serde(default)]
    sort_by: SortBy,
    #[serde(default)]
    sort_order: SortOrder,
    #[serde(default)]
    group_by: GroupBy,
}

impl Default for Chart {
    fn default() -> Self {
        Self {
            colors: colors(),
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            group_by: GroupBy::default(),
        }
    }
}

impl Chart {
    pub fn check(&self) -> Result<(), String> {
        if self.colors.is_empty() {
            return Err("chart color palette must not be empty".into());
        }

        if let Some(color) = self.colors.iter().find(|c| c.trim().is_empty()) {
            return Err(format!("chart color palette has a blank entry: {color:?}"));
        }

        Ok(())
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn sorting(&self) -> SortingOptions {
        SortingOptions::new(self.sort_by, self.sort_order, self.group_by)
    }

    pub fn set_sort_by(&mut self, sort_by: SortBy) {
        self.sort_by = sort_by;
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.sort_order = sort_order;
    }

    pub fn set_group_by(&mut self, group_by: GroupBy) {
        self.group_by = group_by;
    }
}
