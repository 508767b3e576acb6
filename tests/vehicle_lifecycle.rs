mod common;

use std::sync::Arc;

use common::{new_client, RecordingGateway};
use vehicle_registry::store::{ClientGateway, VehicleGateway};
use vehicle_registry::{
    reconcile, ErrorKind, NewVehicle, RegistryError, RegistryService, VehicleCoordinator,
    VehicleUpdate, WriteOutcome,
};

#[tokio::test]
async fn test_create_issues_create_then_associate() {
    let gateway = Arc::new(RecordingGateway::new());
    let ana = gateway.create_client(&new_client("Ana")).await.unwrap();
    gateway.clear_calls();

    let coordinator = VehicleCoordinator::new(Arc::clone(&gateway));
    let vehicle = coordinator
        .create_vehicle(NewVehicle::new("DEF4567", "Onix", Some(ana.id)))
        .await
        .into_result()
        .unwrap();

    assert_eq!(vehicle.client_id, Some(ana.id));
    assert_eq!(
        gateway.calls(),
        vec![
            "create_vehicle".to_string(),
            format!("associate {} -> Some({})", vehicle.id, ana.id),
        ]
    );
}

#[tokio::test]
async fn test_failed_association_leaves_unowned_vehicle() {
    let gateway = Arc::new(RecordingGateway::new());
    let ana = gateway.create_client(&new_client("Ana")).await.unwrap();
    gateway.fail_associations(true);

    let coordinator = VehicleCoordinator::new(Arc::clone(&gateway));
    let outcome = coordinator
        .create_vehicle(NewVehicle::new("DEF4567", "Onix", Some(ana.id)))
        .await;

    let new_id = match &outcome {
        WriteOutcome::PartialFailure {
            vehicle,
            requested_owner,
            error,
        } => {
            assert_eq!(*requested_owner, Some(ana.id));
            assert_eq!(error.kind(), ErrorKind::NetworkFailure);
            vehicle.id
        }
        other => panic!("Expected PartialFailure, got {:?}", other),
    };

    match outcome.into_result() {
        Err(err @ RegistryError::PartialAssociation { .. }) => {
            assert_eq!(err.kind(), ErrorKind::PartialAssociationFailure);
            assert!(err.is_network_failure());
        }
        other => panic!("Expected PartialAssociation, got {:?}", other),
    }

    // the vehicle exists in the backend, without an owner
    let clients = gateway.list_clients_with_vehicles().await.unwrap();
    let flat = gateway.list_vehicles().await.unwrap();
    let reconciled = reconcile(&clients, &flat);
    let stored = reconciled.iter().find(|v| v.id == new_id).unwrap();
    assert_eq!(stored.plate, "DEF4567");
    assert_eq!(stored.client_id, None);
}

#[tokio::test]
async fn test_failed_association_on_update_keeps_new_fields() {
    let gateway = Arc::new(RecordingGateway::new());
    let ana = gateway.create_client(&new_client("Ana")).await.unwrap();
    let bruno = gateway.create_client(&new_client("Bruno")).await.unwrap();
    let service = RegistryService::new(Arc::clone(&gateway));
    let vehicle = service
        .create_vehicle(NewVehicle::new("ABC1234", "Civic", Some(ana.id)))
        .await
        .unwrap();

    gateway.fail_associations(true);
    let update = VehicleUpdate {
        model: Some("City".to_string()),
        client_id: Some(Some(bruno.id)),
        ..Default::default()
    };
    let err = service.update_vehicle(vehicle.id, update).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PartialAssociationFailure);

    // no rollback: model changed, ownership still with the previous client
    let current = service.get_vehicle(vehicle.id).await.unwrap();
    assert_eq!(current.model, "City");
    assert_eq!(current.client_id, Some(ana.id));

    // retrying just the association repairs it
    gateway.fail_associations(false);
    service.associate(vehicle.id, Some(bruno.id)).await.unwrap();
    assert_eq!(
        service.get_vehicle(vehicle.id).await.unwrap().client_id,
        Some(bruno.id)
    );
}

#[tokio::test]
async fn test_update_without_owner_change_skips_association() {
    let gateway = Arc::new(RecordingGateway::new());
    let service = RegistryService::new(Arc::clone(&gateway));
    let vehicle = service
        .create_vehicle(NewVehicle::new("ABC1234", "Civic", None))
        .await
        .unwrap();
    gateway.clear_calls();

    let update = VehicleUpdate {
        plate: Some("ABC1D23".to_string()),
        ..Default::default()
    };
    let updated = service.update_vehicle(vehicle.id, update).await.unwrap();
    assert_eq!(updated.plate, "ABC1D23");
    assert_eq!(gateway.calls(), vec![format!("update_vehicle {}", vehicle.id)]);
}

#[tokio::test]
async fn test_update_with_null_owner_clears_ownership() {
    let gateway = Arc::new(RecordingGateway::new());
    let ana = gateway.create_client(&new_client("Ana")).await.unwrap();
    let service = RegistryService::new(Arc::clone(&gateway));
    let vehicle = service
        .create_vehicle(NewVehicle::new("ABC1234", "Civic", Some(ana.id)))
        .await
        .unwrap();
    gateway.clear_calls();

    let updated = service
        .update_vehicle(vehicle.id, VehicleUpdate::clear_owner())
        .await
        .unwrap();
    assert_eq!(updated.client_id, None);
    assert_eq!(
        gateway.calls(),
        vec![
            format!("update_vehicle {}", vehicle.id),
            format!("associate {} -> None", vehicle.id),
        ]
    );

    let snapshot = service.refresh().await.unwrap();
    let listed = snapshot.vehicles.iter().find(|v| v.id == vehicle.id).unwrap();
    assert_eq!(listed.client_id, None);
    assert_eq!(snapshot.ownership.vehicle_count(ana.id), 0);
}

#[tokio::test]
async fn test_refresh_reads_both_collections() {
    let gateway = Arc::new(RecordingGateway::new());
    let service = RegistryService::new(Arc::clone(&gateway));

    service.refresh().await.unwrap();

    let mut calls = gateway.calls();
    calls.sort();
    assert_eq!(calls, vec!["list_clients_with_vehicles", "list_vehicles"]);
}

#[tokio::test]
async fn test_failed_core_write_issues_no_association() {
    let gateway = Arc::new(RecordingGateway::new());
    let service = RegistryService::new(Arc::clone(&gateway));

    let err = service
        .update_vehicle(404, VehicleUpdate::assign_owner(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(gateway.calls(), vec!["update_vehicle 404".to_string()]);
}
