use florecer_api::{
    config::database_url_from_env,
    db::{create_pool, run_migrations},
    models::Role,
    services::auth_service::set_role,
};

// Usage: migrate [--promote <email>]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let pool = create_pool(&database_url_from_env()).await?;
    run_migrations(&pool).await?;
    println!("Migrations applied");

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--promote" => {
                let email = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--promote needs an email"))?;
                set_role(&pool, &email, Role::Admin)
                    .await
                    .map_err(|err| anyhow::anyhow!("cannot promote {email}: {err}"))?;
                println!("{email} is now an admin");
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    pool.close().await;
    Ok(())
}
