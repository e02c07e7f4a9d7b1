use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use talent_scout::config::{AppConfig, QuestionServiceConfig};
use talent_scout::workflows::screening::{
    CommunicationStyle, ExportFormat, FileExporter, Language, QuestionChain, QuestionDifficulty,
    ScreeningService,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn question_chain(config: &QuestionServiceConfig, offline: bool) -> Arc<QuestionChain> {
    let chain = if offline {
        QuestionChain::offline()
    } else {
        QuestionChain::from_config(config)
    };
    info!(providers = ?chain.provider_names(), "question sources configured");
    Arc::new(chain)
}

pub(crate) fn exporter(config: &AppConfig) -> Arc<FileExporter> {
    Arc::new(FileExporter::new(config.export.directory.clone()))
}

pub(crate) fn screening_service(config: &AppConfig) -> ScreeningService<FileExporter> {
    ScreeningService::new(
        question_chain(&config.questions, false),
        exporter(config),
        config.screening.clone(),
        config.export.format,
    )
}

pub(crate) fn parse_style(raw: &str) -> Result<CommunicationStyle, String> {
    CommunicationStyle::parse(raw)
        .ok_or_else(|| format!("unknown style '{raw}' (expected casual, professional, formal)"))
}

pub(crate) fn parse_difficulty(raw: &str) -> Result<QuestionDifficulty, String> {
    QuestionDifficulty::parse(raw).ok_or_else(|| {
        format!("unknown difficulty '{raw}' (expected easy, medium, hard, adaptive)")
    })
}

pub(crate) fn parse_format(raw: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(raw).ok_or_else(|| format!("unknown format '{raw}' (expected json, csv)"))
}

pub(crate) fn parse_language(raw: &str) -> Result<Language, String> {
    Language::parse(raw)
        .ok_or_else(|| format!("unknown language '{raw}' (expected en, es, fr, de)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_parsers_accept_known_values() {
        assert_eq!(parse_style(" Formal "), Ok(CommunicationStyle::Formal));
        assert_eq!(parse_difficulty("adaptive"), Ok(QuestionDifficulty::Adaptive));
        assert_eq!(parse_format("CSV"), Ok(ExportFormat::Csv));
        assert_eq!(parse_language("Spanish"), Ok(Language::Spanish));
    }

    #[test]
    fn choice_parsers_explain_rejections() {
        let err = parse_format("xml").expect_err("rejected");
        assert!(err.contains("json, csv"));
        assert!(parse_style("shouty").is_err());
        assert!(parse_language("tlh").expect_err("rejected").contains("en, es, fr, de"));
    }

    #[test]
    fn offline_chain_skips_the_ai_provider() {
        let config = QuestionServiceConfig {
            api_key: Some("sk-test".to_string()),
            ..QuestionServiceConfig::default()
        };

        let chain = question_chain(&config, true);

        assert_eq!(chain.provider_names(), vec!["static_table"]);
    }
}
