pub mod lookahead;
pub mod markup;
pub mod render;
pub mod report;
pub mod scoring;
pub mod similarity;
pub mod tokenization;
