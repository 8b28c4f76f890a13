use crate::model::{CompanyId, Person, PersonEvent, PersonId, Services};
use async_trait::async_trait;
use crm_application::{
    MediatorBuilder,
    context::AppContext,
    error::AppError,
    handler::RequestHandler,
    request::{Request, RequestKind},
    validation::{RuleSet, ValidationFailure, ValidationResult, Validator},
};
use crm_domain::domain_event::EventSource;
use crm_domain::entity::Entity;
use crm_domain::repository::{Repository, Scope};
use crm_domain::specification::{Specification, spec_fn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct CreatePerson {
    pub company_id: CompanyId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Request for CreatePerson {
    const NAME: &'static str = "CreatePerson";
    const KIND: RequestKind = RequestKind::Command;
    type Response = PersonId;
}

pub struct ListPeople {
    pub company_id: CompanyId,
    pub include_inactive: bool,
}

impl Request for ListPeople {
    const NAME: &'static str = "ListPeople";
    const KIND: RequestKind = RequestKind::Query;
    type Response = Vec<Person>;
}

fn create_rules() -> RuleSet<CreatePerson> {
    RuleSet::<CreatePerson>::new()
        .not_blank("FirstName", |r| r.first_name.as_str())
        .max_length("FirstName", |r| r.first_name.as_str(), 50)
        .not_blank("LastName", |r| r.last_name.as_str())
        .max_length("LastName", |r| r.last_name.as_str(), 50)
        .not_blank("Email", |r| r.email.as_str())
        .when(
            |r| !r.email.trim().is_empty(),
            RuleSet::<CreatePerson>::new().must(
                "Email",
                |r| r.email.contains('@'),
                "Email is not a valid address.",
            ),
        )
}

/// 外键校验：所属公司必须存在且未被删除
struct CompanyExists {
    services: Arc<Services>,
}

#[async_trait]
impl Validator<CreatePerson> for CompanyExists {
    async fn validate(
        &self,
        _ctx: &AppContext,
        request: &CreatePerson,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult, AppError> {
        let exists = self
            .services
            .companies
            .exists(&request.company_id, Scope::Active, cancel)
            .await?;
        let mut result = ValidationResult::new();
        if !exists {
            result.push(ValidationFailure::new(
                "CompanyId",
                format!("Company {} does not exist.", request.company_id),
            ));
        }
        Ok(result)
    }
}

struct PersonHandlers {
    services: Arc<Services>,
}

#[async_trait]
impl RequestHandler<CreatePerson> for PersonHandlers {
    async fn handle(
        &self,
        _ctx: &AppContext,
        request: CreatePerson,
        cancel: &CancellationToken,
    ) -> Result<PersonId, AppError> {
        let mut person = Person::join(
            request.company_id.clone(),
            request.first_name.trim().to_string(),
            request.last_name.trim().to_string(),
            request.email.trim().to_lowercase(),
            self.services.stamp(),
        );
        person.add_domain_event(PersonEvent::Joined {
            company_id: request.company_id,
            email: person.email.clone(),
        })?;
        let saved = self.services.people.add(person, cancel).await?;
        tracing::info!(person_id = %saved.id(), name = %saved.full_name(), "person created");
        Ok(saved.id().clone())
    }
}

#[async_trait]
impl RequestHandler<ListPeople> for PersonHandlers {
    async fn handle(
        &self,
        _ctx: &AppContext,
        request: ListPeople,
        cancel: &CancellationToken,
    ) -> Result<Vec<Person>, AppError> {
        let company_id = request.company_id;
        let employed_here = spec_fn(move |p: &Person| p.company_id == company_id);
        let with_email = spec_fn(|p: &Person| !p.email.is_empty());
        let scope = Scope::from_include_inactive(request.include_inactive);
        Ok(self
            .services
            .people
            .find(&employed_here.and(with_email), scope, cancel)
            .await?)
    }
}

pub fn register(builder: MediatorBuilder, services: &Arc<Services>) -> MediatorBuilder {
    let handlers = Arc::new(PersonHandlers {
        services: services.clone(),
    });
    builder
        .handler::<CreatePerson, _>(handlers.clone())
        .validator::<CreatePerson, _>(Arc::new(create_rules()))
        .validator::<CreatePerson, _>(Arc::new(CompanyExists {
            services: services.clone(),
        }))
        .handler::<ListPeople, _>(handlers)
}
