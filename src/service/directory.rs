use super::Service;
use crate::error::Result;
use crate::model::{Degree, Teacher};

impl Service {
    pub async fn get_all_teachers(&self) -> Result<Vec<Teacher>> {
        Ok(self.store.load_teachers().await?)
    }

    pub async fn get_all_degrees(&self) -> Result<Vec<Degree>> {
        Ok(self.store.load_degrees().await?)
    }
}
