mod libre_translate_client;

pub use libre_translate_client::LibreTranslateClient;
