//! Data models for aeoscope.

mod audit;
mod fetch;
mod job;
mod page;

pub use audit::{
    CategoryAggregate, CategoryScore, Confidence, ContentClassification, ContentType, DomainAudit,
    GeoComponent, GeoScore, Grade, PageAudit, PageRef, PageScore, Recommendation,
};
pub use fetch::{FetchMethod, FetchResult, PerformanceMetrics};
pub use job::{JobState, JobStatus, ProgressEvent};
pub use page::{
    AnswerPattern, AnswerPatternKind, AuthorInfo, DateInfo, FaqPair, FaqSchema, Heading, ImageInfo,
    ListBlock, PageMeta, PageModel, Paragraph, Question, QuestionSource, SchemaValidation,
    TableBlock,
};
