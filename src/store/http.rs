use crate::error::{RegistryError, Result};
use crate::model::{
    Association, Client, ClientUpdate, Entity, Id, NewClient, Vehicle, VehicleFields, VehiclePatch,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Backend gateway speaking the REST protocol over HTTP
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RegistryError::network("build_client", e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        target: Option<(Entity, Id)>,
    ) -> Result<Response> {
        log::debug!("backend call {}", operation);
        let response = request.send().await.map_err(|e| RegistryError::Network {
            operation,
            status: None,
            message: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            if let Some((entity, id)) = target {
                return Err(RegistryError::not_found(entity, id));
            }
        }

        let body = response.text().await.unwrap_or_default();
        log::warn!("backend call {} returned {}: {}", operation, status, body);
        Err(RegistryError::Network {
            operation,
            status: Some(status.as_u16()),
            message: if body.is_empty() {
                status.to_string()
            } else {
                format!("{}: {}", status, body)
            },
        })
    }

    async fn decode<T: DeserializeOwned>(operation: &'static str, response: Response) -> Result<T> {
        response.json::<T>().await.map_err(|e| RegistryError::Network {
            operation,
            status: None,
            message: format!("invalid response body: {}", e),
        })
    }
}

#[async_trait::async_trait]
impl crate::store::ClientGateway for HttpGateway {
    async fn list_clients(&self) -> Result<Vec<Client>> {
        let op = "list_clients";
        let response = self.send(op, self.client.get(self.url("/clients")), None).await?;
        Self::decode(op, response).await
    }

    async fn list_clients_with_vehicles(&self) -> Result<Vec<Client>> {
        let op = "list_clients_with_vehicles";
        let request = self
            .client
            .get(self.url("/clients"))
            .query(&[("include", "vehicles")]);
        let response = self.send(op, request, None).await?;
        Self::decode(op, response).await
    }

    async fn create_client(&self, client: &NewClient) -> Result<Client> {
        let op = "create_client";
        let request = self.client.post(self.url("/clients")).json(client);
        let response = self.send(op, request, None).await?;
        Self::decode(op, response).await
    }

    async fn update_client(&self, id: Id, update: &ClientUpdate) -> Result<Client> {
        let op = "update_client";
        let request = self
            .client
            .put(self.url(&format!("/clients/{}", id)))
            .json(update);
        let response = self.send(op, request, Some((Entity::Client, id))).await?;
        Self::decode(op, response).await
    }

    async fn delete_client(&self, id: Id) -> Result<()> {
        let request = self.client.delete(self.url(&format!("/clients/{}", id)));
        self.send("delete_client", request, Some((Entity::Client, id)))
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl crate::store::VehicleGateway for HttpGateway {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        let op = "list_vehicles";
        let response = self.send(op, self.client.get(self.url("/vehicles")), None).await?;
        Self::decode(op, response).await
    }

    async fn create_vehicle(&self, fields: &VehicleFields) -> Result<Vehicle> {
        let op = "create_vehicle";
        let request = self.client.post(self.url("/vehicles")).json(fields);
        let response = self.send(op, request, None).await?;
        Self::decode(op, response).await
    }

    async fn update_vehicle(&self, id: Id, patch: &VehiclePatch) -> Result<Vehicle> {
        let op = "update_vehicle";
        let request = self
            .client
            .put(self.url(&format!("/vehicles/{}", id)))
            .json(patch);
        let response = self.send(op, request, Some((Entity::Vehicle, id))).await?;
        Self::decode(op, response).await
    }

    async fn delete_vehicle(&self, id: Id) -> Result<()> {
        let request = self.client.delete(self.url(&format!("/vehicles/{}", id)));
        self.send("delete_vehicle", request, Some((Entity::Vehicle, id)))
            .await?;
        Ok(())
    }

    async fn associate(&self, association: &Association) -> Result<()> {
        let request = self
            .client
            .post(self.url("/vehicles/associate"))
            .json(association);
        // A 404 here may name either side of the link, so it stays a backend failure
        self.send("associate", request, None).await?;
        Ok(())
    }
}
