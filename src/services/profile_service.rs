use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::{
    dto::profile::UpdateProfileRequest,
    entity::profiles::{ActiveModel as ProfileActive, Entity as Profiles, Model as ProfileModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{MemberType, Profile},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn find_profile(state: &AppState, user: &AuthUser) -> AppResult<Option<ProfileModel>> {
    let profile = Profiles::find_by_id(user.user_id).one(&state.orm).await?;
    Ok(profile)
}

/// The caller's member type, `None` without a profile or with an unknown type.
pub async fn member_type(state: &AppState, user: &AuthUser) -> AppResult<Option<MemberType>> {
    let profile = find_profile(state, user).await?;
    Ok(profile.and_then(|p| MemberType::parse(&p.member_type)))
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Profile>> {
    let profile = match find_profile(state, user).await? {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Profile", profile_from_entity(profile), None))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Profile>> {
    let existing = match find_profile(state, user).await? {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ProfileActive = existing.into();
    if let Some(full_name) = payload.full_name {
        if full_name.trim().is_empty() {
            return Err(AppError::BadRequest("full_name must not be empty".into()));
        }
        active.full_name = Set(full_name);
    }
    if let Some(company_name) = payload.company_name {
        active.company_name = Set(Some(company_name));
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    if let Some(city) = payload.city {
        active.city = Set(Some(city));
    }
    if let Some(country) = payload.country {
        active.country = Set(country);
    }
    active.updated_at = Set(Utc::now().into());

    let profile = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Profile updated",
        profile_from_entity(profile),
        Some(Meta::empty()),
    ))
}

fn profile_from_entity(model: ProfileModel) -> Profile {
    Profile {
        id: model.id,
        full_name: model.full_name,
        member_type: model.member_type,
        company_name: model.company_name,
        phone: model.phone,
        address: model.address,
        city: model.city,
        country: model.country,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
