//! Startup profile repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::startups;

/// Profile fields a founder can edit. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateStartupInput {
    /// Registered company name.
    pub company_name: Option<String>,
    /// Country of incorporation.
    pub country: Option<String>,
    /// Reporting currency code.
    pub currency: Option<String>,
    /// Company registration date.
    pub registration_date: Option<NaiveDate>,
    /// Total funding raised, used when no investments are recorded.
    pub total_funding: Option<Decimal>,
}

/// Startup repository.
#[derive(Debug, Clone)]
pub struct StartupRepository {
    db: DatabaseConnection,
}

impl StartupRepository {
    /// Creates a new startup repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a startup by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<startups::Model>, DbErr> {
        startups::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds the startup a user owns.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<startups::Model>, DbErr> {
        startups::Entity::find()
            .filter(startups::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await
    }

    /// Returns the owner's startup, creating an empty one on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or insert fails.
    pub async fn find_or_create_for_owner(&self, owner_id: Uuid) -> Result<startups::Model, DbErr> {
        if let Some(existing) = self.find_by_owner(owner_id).await? {
            return Ok(existing);
        }

        let now = chrono::Utc::now().into();
        startups::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(owner_id),
            company_name: Set(None),
            country: Set(None),
            currency: Set(None),
            registration_date: Set(None),
            total_funding: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }

    /// Applies a profile update.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if the startup does not exist.
    pub async fn update_profile(
        &self,
        id: Uuid,
        input: UpdateStartupInput,
    ) -> Result<startups::Model, DbErr> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("startup {id}")))?;

        let mut active: startups::ActiveModel = existing.into();
        if let Some(company_name) = input.company_name {
            active.company_name = Set(Some(company_name));
        }
        if let Some(country) = input.country {
            active.country = Set(Some(country));
        }
        if let Some(currency) = input.currency {
            active.currency = Set(Some(currency.to_uppercase()));
        }
        if let Some(registration_date) = input.registration_date {
            active.registration_date = Set(Some(registration_date));
        }
        if let Some(total_funding) = input.total_funding {
            active.total_funding = Set(Some(total_funding));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await
    }
}
