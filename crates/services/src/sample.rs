use quiz_core::model::{OptionDraft, Topic};

use crate::catalog::CatalogService;
use crate::error::CatalogError;

/// Name of the topic created by [`seed_sample_catalog`].
pub const SAMPLE_TOPIC: &str = "Geography";

const SAMPLE_QUESTIONS: [(&str, [(&str, bool); 4]); 6] = [
    (
        "What is the capital of France?",
        [("Paris", true), ("London", false), ("Berlin", false), ("Rome", false)],
    ),
    (
        "What is the longest river in South America?",
        [("Amazon", true), ("Paraná", false), ("Orinoco", false), ("São Francisco", false)],
    ),
    (
        "Which is the largest ocean?",
        [("Atlantic", false), ("Indian", false), ("Pacific", true), ("Arctic", false)],
    ),
    (
        "What is the capital of Australia?",
        [("Sydney", false), ("Canberra", true), ("Melbourne", false), ("Perth", false)],
    ),
    (
        "Which country has the most people?",
        [("India", true), ("United States", false), ("Brazil", false), ("Russia", false)],
    ),
    (
        "On which continent is the Sahara?",
        [("Asia", false), ("Oceania", false), ("South America", false), ("Africa", true)],
    ),
];

/// Outcome of seeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub topic: Topic,
    /// Questions written by this call; zero when the topic already existed.
    pub questions_created: usize,
}

/// Create the sample topic and its questions unless the topic exists.
///
/// # Errors
///
/// Returns `CatalogError` if any catalog write fails.
pub async fn seed_sample_catalog(catalog: &CatalogService) -> Result<SeedReport, CatalogError> {
    if let Some(topic) = catalog.find_topic_by_name(SAMPLE_TOPIC).await? {
        tracing::info!(topic = %topic.id(), "sample topic already present");
        return Ok(SeedReport {
            topic,
            questions_created: 0,
        });
    }

    let topic = catalog.create_topic(SAMPLE_TOPIC).await?;
    for (text, options) in SAMPLE_QUESTIONS {
        let drafts = options
            .iter()
            .map(|(option, correct)| OptionDraft::new(*option, *correct))
            .collect();
        catalog.create_question(topic.id(), text, drafts).await?;
    }

    Ok(SeedReport {
        topic,
        questions_created: SAMPLE_QUESTIONS.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn seeding_twice_writes_once() {
        let repo = InMemoryRepository::new();
        let catalog = CatalogService::new(Arc::new(repo.clone()), Arc::new(repo));

        let first = seed_sample_catalog(&catalog).await.unwrap();
        assert_eq!(first.topic.name(), SAMPLE_TOPIC);
        assert_eq!(first.questions_created, SAMPLE_QUESTIONS.len());

        let second = seed_sample_catalog(&catalog).await.unwrap();
        assert_eq!(second.topic, first.topic);
        assert_eq!(second.questions_created, 0);
        assert_eq!(
            catalog.list_questions().await.unwrap().len(),
            SAMPLE_QUESTIONS.len()
        );
    }

    #[test]
    fn every_sample_question_has_one_correct_option() {
        for (text, options) in SAMPLE_QUESTIONS {
            let correct = options.iter().filter(|(_, c)| *c).count();
            assert_eq!(correct, 1, "{text}");
        }
    }
}
