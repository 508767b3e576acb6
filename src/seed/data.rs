use crate::model::{Association, NewClient, VehicleFields};
use crate::store::Gateway;
use anyhow::Result;

/// Demo clients, each with the plates/models of the vehicles it owns
const DEMO_CLIENTS: &[(&str, &str, &[(&str, &str)])] = &[
    ("Ana Souza", "11987654321", &[("ABC1234", "Civic"), ("BRA2E19", "HB20")]),
    ("Bruno Lima", "21976543210", &[("XYZ9876", "Gol")]),
    ("Carla Mendes", "31965432109", &[]),
];

/// Vehicles registered without an owner
const DEMO_UNOWNED: &[(&str, &str)] = &[("QWE4R56", "Onix")];

pub async fn load_seed_data<G: Gateway>(gateway: &G) -> Result<()> {
    for (name, phone, vehicles) in DEMO_CLIENTS {
        let client = gateway
            .create_client(&NewClient {
                name: name.to_string(),
                phone: phone.to_string(),
            })
            .await?;

        for (plate, model) in vehicles.iter() {
            let vehicle = gateway
                .create_vehicle(&VehicleFields {
                    plate: plate.to_string(),
                    model: model.to_string(),
                })
                .await?;
            gateway
                .associate(&Association::new(vehicle.id, Some(client.id)))
                .await?;
        }
    }

    for (plate, model) in DEMO_UNOWNED {
        gateway
            .create_vehicle(&VehicleFields {
                plate: plate.to_string(),
                model: model.to_string(),
            })
            .await?;
    }

    log::info!(
        "seeded {} clients and {} vehicles",
        DEMO_CLIENTS.len(),
        DEMO_CLIENTS.iter().map(|(_, _, v)| v.len()).sum::<usize>() + DEMO_UNOWNED.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::RegistryService;
    use crate::store::InMemoryGateway;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_seed_data_reconciles() {
        let gateway = Arc::new(InMemoryGateway::new());
        load_seed_data(gateway.as_ref()).await.unwrap();

        let stats = RegistryService::new(gateway).dashboard().await.unwrap();
        assert_eq!(stats.total_clients, 3);
        assert_eq!(stats.total_vehicles, 4);
        assert_eq!(stats.unowned_vehicles, 1);
    }
}
