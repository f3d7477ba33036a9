pub mod openai_types;
