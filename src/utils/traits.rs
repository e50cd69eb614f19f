use crate::utils::app_config::AppConfig;

pub trait ActionProcessor<Config, Output> {
    type Error;

    async fn process(&self, app_config: &AppConfig, local_config: &mut Config) -> Result<Output, Self::Error>;
}
