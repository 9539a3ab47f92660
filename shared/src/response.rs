//! Response envelope types shared with clients

use serde::{Deserialize, Serialize};

/// Pagination metadata attached to list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// A page of results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub meta: PageMeta,
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit as u64) as u32
        };
        Self {
            meta: PageMeta {
                page,
                limit,
                total,
                total_pages,
            },
            data,
        }
    }
}
