use crate::model::{Company, CompanyEvent, CompanyId, Services};
use async_trait::async_trait;
use crm_application::{
    MediatorBuilder,
    context::AppContext,
    error::AppError,
    handler::RequestHandler,
    request::{Request, RequestKind},
    validation::RuleSet,
};
use crm_domain::audit::Auditable;
use crm_domain::domain_event::EventSource;
use crm_domain::entity::Entity;
use crm_domain::repository::{Repository, Scope};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct CreateCompany {
    pub name: String,
    pub website: Option<String>,
}

impl Request for CreateCompany {
    const NAME: &'static str = "CreateCompany";
    const KIND: RequestKind = RequestKind::Command;
    type Response = CompanyId;
}

pub struct RenameCompany {
    pub id: CompanyId,
    pub name: String,
}

impl Request for RenameCompany {
    const NAME: &'static str = "RenameCompany";
    const KIND: RequestKind = RequestKind::Command;
    type Response = Company;
}

pub struct DeleteCompany {
    pub id: CompanyId,
}

impl Request for DeleteCompany {
    const NAME: &'static str = "DeleteCompany";
    const KIND: RequestKind = RequestKind::Command;
    type Response = bool;
}

pub struct GetCompany {
    pub id: CompanyId,
    pub include_inactive: bool,
}

impl Request for GetCompany {
    const NAME: &'static str = "GetCompany";
    const KIND: RequestKind = RequestKind::Query;
    type Response = Option<Company>;
}

pub struct ListCompanies {
    pub include_inactive: bool,
}

impl Request for ListCompanies {
    const NAME: &'static str = "ListCompanies";
    const KIND: RequestKind = RequestKind::Query;
    type Response = Vec<Company>;
}

fn create_rules() -> RuleSet<CreateCompany> {
    RuleSet::<CreateCompany>::new()
        .not_blank("Name", |r| r.name.as_str())
        .max_length("Name", |r| r.name.as_str(), 100)
        .when(
            |r| r.website.is_some(),
            RuleSet::<CreateCompany>::new().must(
                "Website",
                |r| {
                    r.website
                        .as_deref()
                        .is_some_and(|w| w.starts_with("http://") || w.starts_with("https://"))
                },
                "Website must be an http(s) URL.",
            ),
        )
}

fn rename_rules() -> RuleSet<RenameCompany> {
    RuleSet::<RenameCompany>::new()
        .not_blank("Name", |r| r.name.as_str())
        .max_length("Name", |r| r.name.as_str(), 100)
}

pub struct CompanyHandlers {
    services: Arc<Services>,
}

#[async_trait]
impl RequestHandler<CreateCompany> for CompanyHandlers {
    async fn handle(
        &self,
        _ctx: &AppContext,
        request: CreateCompany,
        cancel: &CancellationToken,
    ) -> Result<CompanyId, AppError> {
        let mut company = Company::register(
            request.name.trim().to_string(),
            request.website,
            self.services.stamp(),
        );
        company.add_domain_event(CompanyEvent::Registered {
            name: company.name.clone(),
        })?;
        let saved = self.services.companies.add(company, cancel).await?;
        tracing::info!(company_id = %saved.id(), "company registered");
        Ok(saved.id().clone())
    }
}

#[async_trait]
impl RequestHandler<RenameCompany> for CompanyHandlers {
    async fn handle(
        &self,
        _ctx: &AppContext,
        request: RenameCompany,
        cancel: &CancellationToken,
    ) -> Result<Company, AppError> {
        let Some(mut company) = self
            .services
            .companies
            .get_by_id(&request.id, Scope::Active, cancel)
            .await?
        else {
            return Err(AppError::not_found("Company", &request.id));
        };

        let to = request.name.trim().to_string();
        let from = std::mem::replace(&mut company.name, to.clone());
        company.touch(self.services.stamp());
        company.add_domain_event(CompanyEvent::Renamed { from, to })?;
        Ok(self.services.companies.update(company, cancel).await?)
    }
}

#[async_trait]
impl RequestHandler<DeleteCompany> for CompanyHandlers {
    async fn handle(
        &self,
        _ctx: &AppContext,
        request: DeleteCompany,
        cancel: &CancellationToken,
    ) -> Result<bool, AppError> {
        let deleted = self
            .services
            .companies
            .delete(&request.id, self.services.stamp(), cancel)
            .await?;
        if !deleted {
            tracing::debug!(company_id = %request.id, "company absent or already inactive");
        }
        Ok(deleted)
    }
}

#[async_trait]
impl RequestHandler<GetCompany> for CompanyHandlers {
    async fn handle(
        &self,
        _ctx: &AppContext,
        request: GetCompany,
        cancel: &CancellationToken,
    ) -> Result<Option<Company>, AppError> {
        let scope = Scope::from_include_inactive(request.include_inactive);
        Ok(self
            .services
            .companies
            .get_by_id(&request.id, scope, cancel)
            .await?)
    }
}

#[async_trait]
impl RequestHandler<ListCompanies> for CompanyHandlers {
    async fn handle(
        &self,
        _ctx: &AppContext,
        request: ListCompanies,
        cancel: &CancellationToken,
    ) -> Result<Vec<Company>, AppError> {
        let scope = Scope::from_include_inactive(request.include_inactive);
        Ok(self.services.companies.get_all(scope, cancel).await?)
    }
}

pub fn register(builder: MediatorBuilder, services: &Arc<Services>) -> MediatorBuilder {
    let handlers = Arc::new(CompanyHandlers {
        services: services.clone(),
    });
    builder
        .handler::<CreateCompany, _>(handlers.clone())
        .validator::<CreateCompany, _>(Arc::new(create_rules()))
        .handler::<RenameCompany, _>(handlers.clone())
        .validator::<RenameCompany, _>(Arc::new(rename_rules()))
        .handler::<DeleteCompany, _>(handlers.clone())
        .handler::<GetCompany, _>(handlers.clone())
        .handler::<ListCompanies, _>(handlers)
}

/// 用于展示的简要描述
pub(crate) fn describe(company: &Company) -> String {
    format!(
        "{} [{}] website={} active={} modified_by={}",
        company.name,
        company.id(),
        company.website.as_deref().unwrap_or("-"),
        company.is_active(),
        company.modified_by()
    )
}
