use rayon::prelude::*;
use sift_config::pipeline::PipelineConfig;
use sift_core::{FieldValue, LanguageResources, NonTextPolicy, NormalizationError, TextNormalizer};

use crate::fields::{self, FieldOutcome, MalformedField};
use crate::record::{DateParts, Field, NormalizedRecord, RawRecord};

#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorOptions {
    /// Worker threads; 0 runs on the shared rayon pool
    pub workers: usize,
    pub chunk_size: usize,
    pub non_text: NonTextPolicy,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            chunk_size: 256,
            non_text: NonTextPolicy::default(),
        }
    }
}

impl From<&PipelineConfig> for ProcessorOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            workers: config.workers,
            chunk_size: config.chunk_size,
            non_text: config.non_text,
        }
    }
}

/// Why a field of one record was degraded
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Problem {
    #[error(transparent)]
    Malformed(#[from] MalformedField),

    #[error(transparent)]
    NormalizationFailed(#[from] NormalizationError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordIssue {
    /// Position of the record in the input batch
    pub index: usize,
    pub field: Field,
    pub problem: Problem,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueSummary {
    pub unparsable_dates: usize,
    pub unrecognized_labels: usize,
    pub non_text: usize,
    pub normalization_failures: usize,
}

impl IssueSummary {
    pub fn total(&self) -> usize {
        self.unparsable_dates
            + self.unrecognized_labels
            + self.non_text
            + self.normalization_failures
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessReport {
    pub records: Vec<NormalizedRecord>,
    pub issues: Vec<RecordIssue>,
}

impl ProcessReport {
    pub fn summary(&self) -> IssueSummary {
        let mut summary = IssueSummary::default();
        for issue in &self.issues {
            match &issue.problem {
                Problem::Malformed(MalformedField::UnparsableDate(_)) => {
                    summary.unparsable_dates += 1
                }
                Problem::Malformed(MalformedField::UnrecognizedLabel(_)) => {
                    summary.unrecognized_labels += 1
                }
                Problem::Malformed(MalformedField::NonText(_)) => summary.non_text += 1,
                Problem::NormalizationFailed(_) => summary.normalization_failures += 1,
            }
        }
        summary
    }
}

/// Normalizes batches of records.
///
/// Records are processed in fixed-size chunks on a worker pool. Each chunk
/// writes into its own slice of a pre-allocated output, so the output keeps
/// the input order and length. The input batch is only read.
pub struct RecordProcessor<'r> {
    normalizer: TextNormalizer<'r>,
    chunk_size: usize,
    pool: Option<rayon::ThreadPool>,
}

impl<'r> RecordProcessor<'r> {
    pub fn new(resources: &'r LanguageResources) -> Self {
        let options = ProcessorOptions::default();
        Self {
            normalizer: TextNormalizer::new(resources).with_non_text_policy(options.non_text),
            chunk_size: options.chunk_size,
            pool: None,
        }
    }

    pub fn with_options(
        resources: &'r LanguageResources,
        options: ProcessorOptions,
    ) -> Result<Self, ProcessorError> {
        let pool = if options.workers > 0 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(options.workers)
                    .thread_name(|i| format!("sift-worker-{i}"))
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self {
            normalizer: TextNormalizer::new(resources).with_non_text_policy(options.non_text),
            chunk_size: options.chunk_size.max(1),
            pool,
        })
    }

    /// Normalize a batch; output `i` is derived from input `i`
    pub fn process(&self, batch: &[RawRecord]) -> Vec<NormalizedRecord> {
        self.process_with_report(batch).records
    }

    /// Normalize a batch and collect per-field diagnostics
    pub fn process_with_report(&self, batch: &[RawRecord]) -> ProcessReport {
        let report = match &self.pool {
            Some(pool) => pool.install(|| self.run(batch)),
            None => self.run(batch),
        };

        tracing::debug!(
            "Processed {} records with {} issues",
            report.records.len(),
            report.issues.len()
        );
        report
    }

    fn run(&self, batch: &[RawRecord]) -> ProcessReport {
        let chunk_size = self.chunk_size;
        let mut records = vec![NormalizedRecord::default(); batch.len()];

        let issues: Vec<RecordIssue> = records
            .par_chunks_mut(chunk_size)
            .zip(batch.par_chunks(chunk_size))
            .enumerate()
            .flat_map_iter(|(chunk, (slots, inputs))| {
                let base = chunk * chunk_size;
                let mut issues = Vec::new();

                for (offset, (slot, input)) in slots.iter_mut().zip(inputs).enumerate() {
                    let (record, problems) = self.process_record(input);
                    *slot = record;
                    issues.extend(problems.into_iter().map(|(field, problem)| RecordIssue {
                        index: base + offset,
                        field,
                        problem,
                    }));
                }

                issues
            })
            .collect();

        ProcessReport { records, issues }
    }

    /// Normalize one record; problems are reported alongside, never raised
    pub fn process_record(&self, record: &RawRecord) -> (NormalizedRecord, Vec<(Field, Problem)>) {
        let mut problems = Vec::new();

        let title = self.normalize_text_field(Field::Title, record.title.as_ref(), &mut problems);
        let text = self.normalize_text_field(Field::Text, record.text.as_ref(), &mut problems);

        let subject = take(
            Field::Subject,
            fields::normalize_subject(record.subject.as_ref()),
            &mut problems,
        )
        .unwrap_or_default();

        let date = take(
            Field::Date,
            fields::parse_date(record.date.as_ref()).map(DateParts::from),
            &mut problems,
        );

        let label = take(Field::Label, fields::encode_label(record.label.as_ref()), &mut problems);

        let normalized = NormalizedRecord {
            title,
            text,
            subject,
            date,
            label,
            extra: record.extra.clone(),
        };

        (normalized, problems)
    }

    fn normalize_text_field(
        &self,
        field: Field,
        value: Option<&FieldValue>,
        problems: &mut Vec<(Field, Problem)>,
    ) -> String {
        let Some(value) = value else {
            return String::new();
        };

        if self.normalizer.non_text_policy() == NonTextPolicy::Empty
            && !value.is_null()
            && value.as_text().is_none()
        {
            problems.push((field, MalformedField::NonText(value.kind()).into()));
        }

        match self.normalizer.try_normalize(value) {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::warn!("Normalization of {} failed, using empty text: {}", field, e);
                problems.push((field, e.into()));
                String::new()
            }
        }
    }
}

fn take<T>(
    field: Field,
    outcome: FieldOutcome<T>,
    problems: &mut Vec<(Field, Problem)>,
) -> Option<T> {
    match outcome {
        FieldOutcome::Valid(value) => Some(value),
        FieldOutcome::Absent => None,
        FieldOutcome::Invalid(malformed) => {
            tracing::debug!("Malformed {}: {}", field, malformed);
            problems.push((field, malformed.into()));
            None
        }
    }
}
