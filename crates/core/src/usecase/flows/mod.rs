mod explain;
mod service_center;
mod speech;
mod translate;

pub use explain::ExplainFormFlow;
pub use service_center::ServiceCenterFlow;
pub use speech::SpeechFlow;
pub use translate::TranslateExplanationFlow;
