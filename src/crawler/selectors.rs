use crate::config::SiteConfig;
use crate::ConfigError;
use scraper::Selector;

/// Compiled selectors for one site
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub list: Selector,
    pub content: Selector,
    pub date: Selector,
    pub title: Option<Selector>,
}

impl SelectorSet {
    /// Compiles the selectors named in `site`
    pub fn compile(site: &SiteConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            list: compile_one(&site.list_selector)?,
            content: compile_one(&site.content_selector)?,
            date: compile_one(&site.date_selector)?,
            title: site
                .title_selector
                .as_deref()
                .map(compile_one)
                .transpose()?,
        })
    }
}

fn compile_one(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
