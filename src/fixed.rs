use crate::hierarchy::{
    DeviceAttributes,
    ExpandedIndicator,
    ObjectAttributes,
};
use sevone_client::{
    fetch,
    ApiRequest,
    ClientError,
    Device,
    Indicator,
    Object,
    SevOneApi,
};
use sevone_exporter_config::IndicatorRef;

/// Look up the device, object and indicator behind `target`, one after the other.
///
/// The declared coordinates are authoritative for tags and the data request.
pub async fn resolve<A>(api: &A, target: IndicatorRef) -> Result<ExpandedIndicator, ClientError>
where
    A: SevOneApi + ?Sized,
{
    let device: Device = fetch(api, ApiRequest::new(Device::detail_path(target.device_id))).await?;
    let object: Object = fetch(
        api,
        ApiRequest::new(Object::detail_path(target.device_id, target.object_id)),
    )
    .await?;
    let mut indicator: Indicator = fetch(
        api,
        ApiRequest::new(Indicator::detail_path(
            target.device_id,
            target.object_id,
            target.indicator_id,
        )),
    )
    .await?;

    indicator.device_id = target.device_id;
    indicator.object_id = target.object_id;
    indicator.id = target.indicator_id;

    Ok(ExpandedIndicator {
        device: DeviceAttributes::from(&device),
        object: ObjectAttributes::from(&object),
        indicator,
    })
}
