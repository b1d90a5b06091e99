use aurora_core::{Backend, CredentialSource, Credentials, Settings};
use aurora_lambda::Handler;
use aurora_mysql::MysqlBackend;
use aurora_secrets::SecretsManagerStore;
use lambda_http::{run, service_fn, tracing, Body, Error, Request, Response};

async fn function_handler<C, B>(
    handler: &Handler<C, B>,
    _event: Request,
) -> Result<Response<Body>, Error>
where
    C: CredentialSource,
    B: Backend,
{
    Ok(handler.respond().await.into_http()?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let settings = Settings::from_env()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    let credentials =
        Credentials::for_mode(settings.credentials, SecretsManagerStore::from_env).await;
    let handler = Handler::new(credentials, MysqlBackend::new());

    run(service_fn(|event| function_handler(&handler, event))).await
}
