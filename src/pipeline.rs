//! The detect -> decide-direction -> translate pipeline.
//!
//! One [`TranslationPipeline::run`] call owns the whole lifecycle of any
//! capability instances it creates: create, await readiness, use, destroy.
//! Nothing leaks across runs. Every failure path resolves to a typed
//! [`TranslationOutcome::Failure`]; this function never returns `Err` and
//! never panics on host faults.

use crate::capability::{
    Availability, Detector, DetectorProvider, HostInfo, ProgressFn, Translator, TranslatorProvider,
};
use crate::lang::{normalize_detected, LanguagePair};
use crate::outcome::{TranslationError, TranslationOutcome};
use crate::probe::CapabilityProbe;
use std::sync::Arc;

pub struct TranslationPipeline {
    detectors: Arc<dyn DetectorProvider>,
    translators: Arc<dyn TranslatorProvider>,
    probe: CapabilityProbe,
    languages: LanguagePair,
}

impl TranslationPipeline {
    pub fn new(
        detectors: Arc<dyn DetectorProvider>,
        translators: Arc<dyn TranslatorProvider>,
        host: Arc<dyn HostInfo>,
        languages: LanguagePair,
    ) -> Self {
        let probe = CapabilityProbe::new(
            Arc::clone(&detectors),
            Arc::clone(&translators),
            host,
            languages.clone(),
        );
        Self { detectors, translators, probe, languages }
    }

    pub fn languages(&self) -> &LanguagePair {
        &self.languages
    }

    /// Runs the full pipeline on `text`. Download progress, when a model
    /// fetch is needed, is forwarded through `on_progress`.
    pub async fn run(&self, text: &str, on_progress: Option<ProgressFn>) -> TranslationOutcome {
        log::info!("pipeline run: {} chars", text.chars().count());

        let detector = match self.acquire_detector(on_progress.clone()).await {
            Ok(detector) => detector,
            Err(failure) => return failure,
        };

        let candidates = match detector.detect(text).await {
            Ok(candidates) => candidates,
            Err(err) => {
                detector.destroy();
                log::warn!("language detection failed: {err:#}");
                return TranslationOutcome::unexpected("detecting the language");
            }
        };
        detector.destroy();

        let Some(top) = candidates.first() else {
            log::warn!("detector returned no candidates");
            return TranslationOutcome::unexpected("detecting the language");
        };
        let source = normalize_detected(&top.language).to_string();
        log::info!(
            "detected {} (confidence {:.2}, raw {})",
            source,
            top.confidence,
            top.language
        );

        let target = self.languages.target_for(&source).to_string();
        if source == target {
            // Source already in the target language; the identity translation
            // is a valid success, not an error.
            log::debug!("source equals target ({source}), returning text unchanged");
            return TranslationOutcome::Success(text.to_string());
        }

        let translator = match self.acquire_translator(&source, &target, on_progress).await {
            Ok(translator) => translator,
            Err(failure) => return failure,
        };

        let outcome = match translator.translate(text).await {
            Ok(translated) => {
                log::info!("translated {source}->{target}: {} chars", translated.chars().count());
                TranslationOutcome::Success(translated)
            }
            Err(err) => {
                log::warn!("translation {source}->{target} failed: {err:#}");
                TranslationOutcome::unexpected("translating the text")
            }
        };
        translator.destroy();
        outcome
    }

    async fn acquire_detector(
        &self,
        on_progress: Option<ProgressFn>,
    ) -> Result<Box<dyn Detector>, TranslationOutcome> {
        match self.probe.probe_detector().await {
            Availability::Unavailable => {
                let guide = self.probe.diagnose().await;
                Err(TranslationOutcome::Failure(TranslationError::from_guide(guide)))
            }
            Availability::Available => match self.detectors.create(None).await {
                Ok(detector) => Ok(detector),
                Err(err) => {
                    log::warn!("detector create failed: {err:#}");
                    Err(TranslationOutcome::unexpected("preparing language detection"))
                }
            },
            status @ (Availability::Downloadable | Availability::Downloading) => {
                log::info!("detector model {status}, creating with download monitor");
                let detector = match self.detectors.create(on_progress).await {
                    Ok(detector) => detector,
                    Err(err) => {
                        log::warn!("detector create failed: {err:#}");
                        return Err(TranslationOutcome::unexpected(
                            "downloading the detection model",
                        ));
                    }
                };
                if let Err(err) = detector.ready().await {
                    detector.destroy();
                    log::warn!("detector never became ready: {err:#}");
                    return Err(TranslationOutcome::unexpected(
                        "downloading the detection model",
                    ));
                }
                Ok(detector)
            }
        }
    }

    async fn acquire_translator(
        &self,
        source: &str,
        target: &str,
        on_progress: Option<ProgressFn>,
    ) -> Result<Box<dyn Translator>, TranslationOutcome> {
        match self.probe.probe_translator(source, target).await {
            Availability::Unavailable => {
                let guide = self.probe.diagnose().await;
                Err(TranslationOutcome::Failure(TranslationError::from_guide(guide)))
            }
            Availability::Available => {
                match self.translators.create(source, target, None).await {
                    Ok(translator) => Ok(translator),
                    Err(err) => {
                        log::warn!("translator create failed: {err:#}");
                        Err(TranslationOutcome::unexpected("preparing the translator"))
                    }
                }
            }
            status @ (Availability::Downloadable | Availability::Downloading) => {
                log::info!("translator model {source}->{target} {status}, creating with download monitor");
                let translator = match self.translators.create(source, target, on_progress).await {
                    Ok(translator) => translator,
                    Err(err) => {
                        log::warn!("translator create failed: {err:#}");
                        return Err(TranslationOutcome::unexpected(
                            "downloading the translation model",
                        ));
                    }
                };
                if let Err(err) = translator.ready().await {
                    translator.destroy();
                    log::warn!("translator never became ready: {err:#}");
                    return Err(TranslationOutcome::unexpected(
                        "downloading the translation model",
                    ));
                }
                Ok(translator)
            }
        }
    }
}
