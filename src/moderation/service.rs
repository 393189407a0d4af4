//! Owner of the moderation lists and the pipeline.
//!
//! Admin commands are methods here; they mutate the shared keyword list and
//! whitelist that every pipeline run reads.

use std::sync::Arc;

use super::bypass::BypassAuthority;
use super::event::MessageEvent;
use super::flood::FloodSettings;
use super::pipeline::{ModerationPipeline, Verdict};
use crate::classifier::ClassifierGateway;
use crate::store::{BatchOutcome, SharedList, StoreError};

/// Keywords seeded on first start.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "广告",
    "优惠",
    "促销",
    "打折",
    "限时",
    "推广",
    "赞助",
    "ad",
    "advertisement",
    "promo",
    "discount",
    "sale",
    "sponsor",
];

/// Result of an admin batch command, rendered by the command plugins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListReport {
    /// Entries added or removed.
    pub changed: Vec<String>,
    /// Entries already present (add) or not found (remove).
    pub unchanged: Vec<String>,
    /// Arguments that are not valid entries.
    pub invalid: Vec<String>,
}

impl ListReport {
    fn from_outcome<T: ToString>(outcome: BatchOutcome<T>) -> Self {
        Self {
            changed: outcome.changed.iter().map(T::to_string).collect(),
            unchanged: outcome.unchanged.iter().map(T::to_string).collect(),
            invalid: Vec::new(),
        }
    }
}

/// The moderation service shared by handlers.
pub struct ModerationService {
    bypass: BypassAuthority,
    keywords: Arc<SharedList<String>>,
    whitelist: Arc<SharedList<i64>>,
    pipeline: ModerationPipeline,
}

impl ModerationService {
    pub fn new(
        admins: impl IntoIterator<Item = i64>,
        keywords: Arc<SharedList<String>>,
        whitelist: Arc<SharedList<i64>>,
        flood: Option<FloodSettings>,
        classifier: Option<ClassifierGateway>,
    ) -> Self {
        let bypass = BypassAuthority::new(admins, whitelist.clone());
        let pipeline = ModerationPipeline::new(bypass.clone(), keywords.clone(), flood, classifier);

        Self {
            bypass,
            keywords,
            whitelist,
            pipeline,
        }
    }

    pub fn is_admin(&self, id: i64) -> bool {
        self.bypass.is_admin(id)
    }

    pub fn pipeline(&self) -> &ModerationPipeline {
        &self.pipeline
    }

    /// Moderate one inbound message.
    pub async fn evaluate(&self, event: &MessageEvent) -> Verdict {
        self.pipeline.evaluate(event).await
    }

    pub fn keywords(&self) -> Arc<Vec<String>> {
        self.keywords.snapshot()
    }

    pub fn whitelist(&self) -> Arc<Vec<i64>> {
        self.whitelist.snapshot()
    }

    /// Add keywords; existing ones are reported, not duplicated.
    pub async fn add_keywords(&self, args: &[&str]) -> Result<ListReport, StoreError> {
        let outcome = self
            .keywords
            .insert_many(args.iter().map(|s| s.to_string()))
            .await?;
        Ok(ListReport::from_outcome(outcome))
    }

    pub async fn remove_keywords(&self, args: &[&str]) -> Result<ListReport, StoreError> {
        let outcome = self
            .keywords
            .remove_many(args.iter().map(|s| s.to_string()))
            .await?;
        Ok(ListReport::from_outcome(outcome))
    }

    /// Whitelist user or channel ids; non-numeric arguments are reported invalid.
    pub async fn add_whitelist(&self, args: &[&str]) -> Result<ListReport, StoreError> {
        let (ids, invalid) = parse_ids(args);
        let mut report = ListReport::from_outcome(self.whitelist.insert_many(ids).await?);
        report.invalid = invalid;
        Ok(report)
    }

    /// Remove ids from the whitelist; non-numeric arguments count as not found.
    pub async fn remove_whitelist(&self, args: &[&str]) -> Result<ListReport, StoreError> {
        let (ids, invalid) = parse_ids(args);
        let mut report = ListReport::from_outcome(self.whitelist.remove_many(ids).await?);
        report.unchanged.extend(invalid);
        Ok(report)
    }
}

fn parse_ids(args: &[&str]) -> (Vec<i64>, Vec<String>) {
    let mut ids = Vec::new();
    let mut invalid = Vec::new();
    for arg in args {
        match arg.parse::<i64>() {
            Ok(id) => ids.push(id),
            Err(_) => invalid.push(arg.to_string()),
        }
    }
    (ids, invalid)
}

#[cfg(test)]
mod tests {
    use super::super::event::fixtures::*;
    use super::super::pipeline::Skip;
    use super::*;
    use crate::store::testing::shared_list;

    async fn service() -> ModerationService {
        let keywords = shared_list(DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect()).await;
        let whitelist = shared_list(Vec::new()).await;
        ModerationService::new([1827922677, 6086963281], keywords, whitelist, None, None)
    }

    #[tokio::test]
    async fn test_add_existing_keyword_reports_already_exists() {
        let service = service().await;
        let before = service.keywords();

        let report = service.add_keywords(&["广告"]).await.unwrap();
        assert!(report.changed.is_empty());
        assert_eq!(report.unchanged, vec!["广告".to_string()]);
        assert_eq!(service.keywords(), before);
    }

    #[tokio::test]
    async fn test_add_and_remove_keywords() {
        let service = service().await;

        let added = service.add_keywords(&["加群", "vx"]).await.unwrap();
        assert_eq!(added.changed, vec!["加群".to_string(), "vx".to_string()]);

        let removed = service.remove_keywords(&["vx", "missing"]).await.unwrap();
        assert_eq!(removed.changed, vec!["vx".to_string()]);
        assert_eq!(removed.unchanged, vec!["missing".to_string()]);
        assert!(service.keywords().contains(&"加群".to_string()));
    }

    #[tokio::test]
    async fn test_whitelist_batch_partially_succeeds() {
        let service = service().await;

        let report = service
            .add_whitelist(&["42", "abc", "-1001234567890", "42"])
            .await
            .unwrap();
        assert_eq!(report.changed, vec!["42".to_string(), "-1001234567890".to_string()]);
        assert_eq!(report.unchanged, vec!["42".to_string()]);
        assert_eq!(report.invalid, vec!["abc".to_string()]);

        let removed = service.remove_whitelist(&["42", "7", "x"]).await.unwrap();
        assert_eq!(removed.changed, vec!["42".to_string()]);
        assert_eq!(removed.unchanged, vec!["7".to_string(), "x".to_string()]);
        assert_eq!(*service.whitelist(), vec![-1001234567890]);
    }

    #[tokio::test]
    async fn test_whitelisting_exempts_author() {
        let service = service().await;
        let event = group_message(user(42, "Seller"), "big sale");

        assert!(matches!(service.evaluate(&event).await, Verdict::Delete(_)));

        service.add_whitelist(&["42"]).await.unwrap();
        assert_eq!(service.evaluate(&event).await, Verdict::Ignore(Skip::Exempt));
    }

    #[tokio::test]
    async fn test_admin_membership() {
        let service = service().await;

        assert!(service.is_admin(6086963281));
        assert!(!service.is_admin(42));
    }
}
