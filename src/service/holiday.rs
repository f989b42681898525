use chrono::NaiveDate;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::model::holiday::Holiday;
use crate::store::{Batch, Mutation, Store};

pub async fn list(store: &dyn Store) -> AppResult<Vec<Holiday>> {
    Ok(store.list_holidays().await?)
}

/// Adds or replaces the holiday on that date.
pub async fn put(store: &dyn Store, holiday: Holiday) -> AppResult<Holiday> {
    let holiday = Holiday {
        description: holiday.description.trim().to_string(),
        ..holiday
    };
    if holiday.description.is_empty() {
        return Err(AppError::Validation(vec!["description must not be empty".into()]));
    }

    store.apply(Batch::single(Mutation::PutHoliday(holiday.clone()))).await?;
    info!(date = %holiday.date, "Holiday saved");
    Ok(holiday)
}

pub async fn delete(store: &dyn Store, date: NaiveDate) -> AppResult<()> {
    let exists = store.list_holidays().await?.iter().any(|h| h.date == date);
    if !exists {
        return Err(AppError::NotFound(format!("No holiday on {date}")));
    }
    store.apply(Batch::single(Mutation::DeleteHoliday(date))).await?;
    info!(%date, "Holiday deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::fixtures::{date, store_with};

    #[actix_web::test]
    async fn put_replaces_and_delete_requires_existing() {
        let store = store_with(vec![], vec![]).await;
        let day = date(2024, 3, 25);

        put(store.as_ref(), Holiday { date: day, description: "Holi".into() }).await.unwrap();
        put(store.as_ref(), Holiday { date: day, description: " Holi (observed) ".into() })
            .await
            .unwrap();

        let all = list(store.as_ref()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].description, "Holi (observed)");

        let blank = put(store.as_ref(), Holiday { date: day, description: "  ".into() }).await;
        assert!(matches!(blank, Err(AppError::Validation(_))));

        delete(store.as_ref(), day).await.unwrap();
        assert!(matches!(delete(store.as_ref(), day).await, Err(AppError::NotFound(_))));
    }
}
