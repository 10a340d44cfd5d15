use std::sync::Arc;

use crate::{
    db::DbPool,
    errors::ServiceError,
    repositories::{
        transaction_repository::{TransactionHistory, TransactionHistoryFilter},
        Page, PageRequest, TransactionRepository,
    },
};

#[derive(Clone)]
pub struct TransactionService {
    db: Arc<DbPool>,
}

impl TransactionService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Audit history, newest first
    pub async fn history(
        &self,
        filter: &TransactionHistoryFilter,
        request: PageRequest,
    ) -> Result<Page<TransactionHistory>, ServiceError> {
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if start > end {
                return Err(ServiceError::InvalidArgument(
                    "startDate must not be after endDate".to_string(),
                ));
            }
        }
        Ok(TransactionRepository::history(self.db.as_ref(), filter, request).await?)
    }
}
