//! Device → object → indicator expansion.
//!
//! Each level is fetched with one paginated listing per parent. Children are
//! stamped with copies of their parents' display attributes so that the
//! formatter never has to look a parent up again.

use crate::report::{
    BranchFailure,
    Stage,
};
use futures::{
    stream,
    StreamExt,
};
use serde::de::DeserializeOwned;
use sevone_client::{
    Device,
    Indicator,
    Object,
    Pager,
    SevOneApi,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceAttributes {
    pub name: String,
    pub alternate_name: Option<String>,
    pub description: Option<String>,
    pub ip_address: Option<String>,
}

impl From<&Device> for DeviceAttributes {
    fn from(device: &Device) -> Self {
        Self {
            name: device.name.clone(),
            alternate_name: device.alternate_name.clone(),
            description: device.description.clone(),
            ip_address: device.ip_address.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectAttributes {
    pub name: String,
    pub description: Option<String>,
    pub alternate_name: Option<String>,
}

impl From<&Object> for ObjectAttributes {
    fn from(object: &Object) -> Self {
        Self {
            name: object.name.clone(),
            description: object.description.clone(),
            alternate_name: object.alternate_name.clone(),
        }
    }
}

/// An object together with its device's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedObject {
    pub device: DeviceAttributes,
    pub object: Object,
}

/// An indicator together with its device's and object's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedIndicator {
    pub device: DeviceAttributes,
    pub object: ObjectAttributes,
    pub indicator: Indicator,
}

impl ExpandedObject {
    pub fn new(device: &Device, mut object: Object) -> Self {
        object.device_id = device.id;
        Self {
            device: device.into(),
            object,
        }
    }
}

impl ExpandedIndicator {
    pub fn new(parent: &ExpandedObject, mut indicator: Indicator) -> Self {
        indicator.device_id = parent.object.device_id;
        indicator.object_id = parent.object.id;
        Self {
            device: parent.device.clone(),
            object: (&parent.object).into(),
            indicator,
        }
    }
}

#[derive(Debug)]
pub struct Expansion<C> {
    pub children: Vec<C>,
    pub failures: Vec<BranchFailure>,
}

/// Fans out one paginated listing per parent, at most `concurrency` at a time.
pub struct Expander<'a, A: ?Sized> {
    pager: Pager<'a, A>,
    concurrency: usize,
}

impl<'a, A> Expander<'a, A>
where
    A: SevOneApi + ?Sized,
{
    pub fn new(pager: Pager<'a, A>, concurrency: usize) -> Self {
        Self {
            pager,
            concurrency: concurrency.max(1),
        }
    }

    /// List the children of every parent and stamp them with `stamp`.
    ///
    /// A parent whose listing fails contributes no children and a
    /// [`BranchFailure`]; its siblings are unaffected.
    pub async fn expand<P, C, R>(
        &self,
        stage: Stage,
        parents: Vec<P>,
        child_path: impl Fn(&P) -> String,
        stamp: impl Fn(&P, C) -> R,
    ) -> Expansion<R>
    where
        C: DeserializeOwned,
    {
        let pager = self.pager;
        let mut listings = stream::iter(parents.into_iter().map(|parent| {
            let path = child_path(&parent);
            async move {
                let listing = pager.fetch_all::<C>(&path).await;
                (parent, path, listing)
            }
        }))
        .buffer_unordered(self.concurrency);

        let mut expansion = Expansion {
            children: Vec::new(),
            failures: Vec::new(),
        };
        while let Some((parent, path, listing)) = listings.next().await {
            match listing {
                Ok(listing) => {
                    for failed in listing.failed_pages {
                        expansion.failures.push(BranchFailure::new(
                            stage,
                            format!("{path} (page {})", failed.page),
                            &failed.error,
                        ));
                    }
                    expansion
                        .children
                        .extend(listing.items.into_iter().map(|child| stamp(&parent, child)));
                }
                Err(error) => expansion.failures.push(BranchFailure::new(stage, path, &error)),
            }
        }
        expansion
    }

    pub async fn objects(&self, devices: Vec<Device>) -> Expansion<ExpandedObject> {
        self.expand(Stage::Objects, devices, Device::objects_path, |device, object: Object| {
            ExpandedObject::new(device, object)
        })
        .await
    }

    pub async fn indicators(&self, objects: Vec<ExpandedObject>) -> Expansion<ExpandedIndicator> {
        self.expand(
            Stage::Indicators,
            objects,
            |parent| parent.object.indicators_path(),
            |parent, indicator: Indicator| ExpandedIndicator::new(parent, indicator),
        )
        .await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fake::FakeApi;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sevone_client::PagePolicy;

    fn device(id: u64, name: &str) -> Device {
        Device {
            id,
            name: name.to_string(),
            alternate_name: Some(format!("{name}-alt")),
            description: None,
            ip_address: Some("10.0.0.1".to_string()),
        }
    }

    #[tokio::test]
    async fn objects_inherit_device_attributes() {
        let api = FakeApi::default()
            .listing("/devices/1/objects", json!([{ "id": 10, "name": "eth0", "description": "uplink" }]))
            .listing("/devices/2/objects", json!([]));
        let expander = Expander::new(Pager::new(&api, 20, PagePolicy::Strict, 8), 8);

        let expansion = expander.objects(vec![device(1, "router"), device(2, "switch")]).await;

        assert!(expansion.failures.is_empty());
        assert_eq!(expansion.children.len(), 1);
        let object = &expansion.children[0];
        assert_eq!(object.device, DeviceAttributes::from(&device(1, "router")));
        assert_eq!(object.object.device_id, 1);
        assert_eq!(object.object.indicators_path(), "/devices/1/objects/10/indicators");
    }

    #[tokio::test]
    async fn indicators_inherit_device_and_object_attributes() {
        let api = FakeApi::default().listing(
            "/devices/1/objects/10/indicators",
            json!([
                { "id": 100, "name": "in", "dataUnits": "bytes" },
                { "id": 101, "name": "out", "dataUnits": "bytes" }
            ]),
        );
        let expander = Expander::new(Pager::new(&api, 20, PagePolicy::Strict, 8), 8);
        let parent = ExpandedObject::new(
            &device(1, "router"),
            serde_json::from_value(json!({ "id": 10, "name": "eth0", "alternateName": "Gi0/0" })).unwrap(),
        );

        let mut expansion = expander.indicators(vec![parent]).await;
        expansion.children.sort_by_key(|c| c.indicator.id);

        let names: Vec<_> = expansion.children.iter().map(|c| c.indicator.name.as_str()).collect();
        assert_eq!(names, vec!["in", "out"]);
        for child in &expansion.children {
            assert_eq!(child.device.name, "router");
            assert_eq!(child.object.name, "eth0");
            assert_eq!(child.object.alternate_name.as_deref(), Some("Gi0/0"));
            assert_eq!(child.indicator.data_path(), format!("/devices/1/objects/10/indicators/{}/data", child.indicator.id));
        }
    }

    #[tokio::test]
    async fn failed_parent_does_not_abort_siblings() {
        let api = FakeApi::default()
            .fail("/devices/1/objects")
            .listing("/devices/2/objects", json!([{ "id": 20, "name": "eth1" }]));
        let expander = Expander::new(Pager::new(&api, 20, PagePolicy::Strict, 8), 8);

        let expansion = expander.objects(vec![device(1, "router"), device(2, "switch")]).await;

        assert_eq!(expansion.children.len(), 1);
        assert_eq!(expansion.children[0].device.name, "switch");
        assert_eq!(expansion.failures.len(), 1);
        assert_eq!(expansion.failures[0].stage, Stage::Objects);
        assert_eq!(expansion.failures[0].target, "/devices/1/objects");
    }

    #[tokio::test]
    async fn best_effort_pages_surface_as_failures() {
        let api = FakeApi::default()
            .page("/devices/1/objects", 0, 2, json!([{ "id": 10, "name": "eth0" }]))
            .fail_page("/devices/1/objects", 1);
        let expander = Expander::new(Pager::new(&api, 1, PagePolicy::BestEffort, 8), 8);

        let expansion = expander.objects(vec![device(1, "router")]).await;

        assert_eq!(expansion.children.len(), 1);
        assert_eq!(expansion.failures.len(), 1);
        assert_eq!(expansion.failures[0].target, "/devices/1/objects (page 1)");
    }
}
