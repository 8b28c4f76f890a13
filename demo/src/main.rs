//! CRM 示例：公司与联系人
//!
//! 通过分发器完成注册、校验失败、重命名、逻辑删除与查询。
//! 日志级别由 `RUST_LOG` 控制，默认 `info`。
//!
mod company;
mod model;
mod person;

use anyhow::{Context, bail};
use company::{CreateCompany, DeleteCompany, GetCompany, ListCompanies, RenameCompany};
use crm_application::{
    Mediator, MediatorConfig, Outcome, context::AppContext, request::Request,
    validation::ValidationMode,
};
use crm_domain::audit::UserId;
use crm_domain::entity::EntityId;
use crm_domain::memory::InMemoryRepository;
use crm_domain::provider::{StaticUser, SystemClock};
use model::{CompanyId, Services};
use person::{CreatePerson, ListPeople};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// 校验失败在示例里视为预期结果，打印后返回 `None`
fn report<T>(name: &str, outcome: Outcome<T>) -> Option<T> {
    match outcome {
        Outcome::Completed(value) => Some(value),
        Outcome::ValidationFailed(failures) => {
            println!("{name} rejected:");
            for failure in &failures {
                println!("  - {failure}");
            }
            None
        }
    }
}

async fn send<R: Request>(
    mediator: &Mediator,
    ctx: &AppContext,
    request: R,
    cancel: &CancellationToken,
) -> anyhow::Result<Option<R::Response>> {
    let outcome = mediator
        .send(ctx, request, cancel)
        .await
        .with_context(|| format!("dispatching {}", R::NAME))?;
    Ok(report(R::NAME, outcome))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let services = Arc::new(Services {
        companies: Arc::new(InMemoryRepository::new()),
        people: Arc::new(InMemoryRepository::new()),
        clock: Arc::new(SystemClock),
        user: Arc::new(StaticUser::new(UserId::new("demo-admin".to_string()))),
    });

    let builder = Mediator::builder().config(
        MediatorConfig::builder()
            .validation_mode(ValidationMode::Concurrent)
            .slow_request_threshold(Duration::from_millis(250))
            .build(),
    );
    let builder = company::register(builder, &services);
    let mediator = person::register(builder, &services)
        .build()
        .context("mediator configuration")?;
    tracing::info!(requests = ?mediator.registered_requests(), "mediator ready");

    let ctx = AppContext::builder().correlation_id("demo-run").build();
    let cancel = CancellationToken::new();

    // 校验失败：名称为空、网址格式错误
    send(
        &mediator,
        &ctx,
        CreateCompany {
            name: "  ".into(),
            website: Some("acme.example".into()),
        },
        &cancel,
    )
    .await?;

    let Some(acme) = send(
        &mediator,
        &ctx,
        CreateCompany {
            name: "Acme".into(),
            website: Some("https://acme.example".into()),
        },
        &cancel,
    )
    .await?
    else {
        bail!("Acme should have been registered");
    };

    // 外键校验：公司不存在
    send(
        &mediator,
        &ctx,
        CreatePerson {
            company_id: CompanyId::generate(),
            first_name: "Ghost".into(),
            last_name: "Writer".into(),
            email: "ghost@nowhere".into(),
        },
        &cancel,
    )
    .await?;

    send(
        &mediator,
        &ctx,
        CreatePerson {
            company_id: acme.clone(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "Ada@Acme.example".into(),
        },
        &cancel,
    )
    .await?;

    if let Some(renamed) = send(
        &mediator,
        &ctx,
        RenameCompany {
            id: acme.clone(),
            name: "Acme Corp".into(),
        },
        &cancel,
    )
    .await?
    {
        println!("renamed: {}", company::describe(&renamed));
    }

    let people = send(
        &mediator,
        &ctx,
        ListPeople {
            company_id: acme.clone(),
            include_inactive: false,
        },
        &cancel,
    )
    .await?
    .unwrap_or_default();
    for person in &people {
        println!("employee: {} <{}>", person.full_name(), person.email);
    }

    let deleted = send(&mediator, &ctx, DeleteCompany { id: acme.clone() }, &cancel).await?;
    println!("deleted: {deleted:?}");

    let visible = send(
        &mediator,
        &ctx,
        GetCompany {
            id: acme.clone(),
            include_inactive: false,
        },
        &cancel,
    )
    .await?
    .flatten();
    println!("visible after delete: {}", visible.is_some());

    let all = send(
        &mediator,
        &ctx,
        ListCompanies {
            include_inactive: true,
        },
        &cancel,
    )
    .await?
    .unwrap_or_default();
    for company in &all {
        println!("stored: {}", company::describe(company));
    }

    // 已删除的公司不能再重命名
    match mediator
        .send(
            &ctx,
            RenameCompany {
                id: acme,
                name: "Phoenix".into(),
            },
            &cancel,
        )
        .await
    {
        Err(err) => println!("rename after delete failed as expected: {err}"),
        Ok(_) => bail!("renaming a deleted company should fail"),
    }

    println!(
        "published events: companies={}, people={}",
        services.companies.published_events().len(),
        services.people.published_events().len()
    );

    Ok(())
}
