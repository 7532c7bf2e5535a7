//! Plugin identity and the functions it exposes to a host

use crate::filter::{CreateError, Pack, Unpack};
use crate::node::NodeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginInfo {
    pub identifier: &'static str,
    pub namespace: &'static str,
    pub name: &'static str,
    /// (major, minor)
    pub version: (u16, u16),
}

pub const PLUGIN_INFO: PluginInfo = PluginInfo {
    identifier: "com.djatom.libp2p",
    namespace: "libp2p",
    name: "libp2p rgb formats packer/unpacker",
    version: (1, 0),
};

/// A filter constructor registered with the host
#[derive(Debug, Clone, Copy)]
pub struct Function {
    pub name: &'static str,
    pub args: &'static str,
    pub returns: &'static str,
    create: fn(NodeRef) -> Result<NodeRef, CreateError>,
}

impl Function {
    pub fn create(&self, clip: NodeRef) -> Result<NodeRef, CreateError> {
        (self.create)(clip)
    }
}

/// Host side of plugin registration
pub trait Registry {
    fn config_plugin(&mut self, info: PluginInfo);
    fn register_function(&mut self, function: Function);
}

pub fn functions() -> [Function; 2] {
    [
        Function {
            name: "Pack",
            args: "clip:vnode;",
            returns: "clip:vnode;",
            create: |clip| Pack::new(clip).map(Pack::into_node),
        },
        Function {
            name: "Unpack",
            args: "clip:vnode;",
            returns: "clip:vnode;",
            create: |clip| Unpack::new(clip).map(Unpack::into_node),
        },
    ]
}

/// Entry point called once by the host when loading the plugin
pub fn plugin_init(registry: &mut dyn Registry) {
    registry.config_plugin(PLUGIN_INFO);

    for function in functions() {
        registry.register_function(function);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Clip, fetch_frame};
    use crate::{Frame, ImageRef, PixelFormat};

    #[derive(Default)]
    struct TestRegistry {
        info: Option<PluginInfo>,
        functions: Vec<Function>,
    }

    impl Registry for TestRegistry {
        fn config_plugin(&mut self, info: PluginInfo) {
            self.info = Some(info);
        }

        fn register_function(&mut self, function: Function) {
            self.functions.push(function);
        }
    }

    impl TestRegistry {
        fn invoke(&self, name: &str, clip: NodeRef) -> Result<NodeRef, CreateError> {
            let function = self
                .functions
                .iter()
                .find(|function| function.name == name)
                .unwrap();

            function.create(clip)
        }
    }

    #[test]
    fn registers_pack_and_unpack() {
        let mut registry = TestRegistry::default();
        plugin_init(&mut registry);

        assert_eq!(registry.info, Some(PLUGIN_INFO));

        let names: Vec<_> = registry.functions.iter().map(|f| f.name).collect();
        assert_eq!(names, ["Pack", "Unpack"]);
        assert!(registry.functions.iter().all(|f| f.args == "clip:vnode;"));
    }

    #[test]
    fn invoke_registered_functions() {
        let mut registry = TestRegistry::default();
        plugin_init(&mut registry);

        let clip = Clip::new(vec![Frame::new(PixelFormat::RGB24, 8, 2)])
            .unwrap()
            .into_node();

        let packed = registry.invoke("Pack", clip).unwrap();
        let unpacked = registry.invoke("Unpack", packed).unwrap();

        assert_eq!(unpacked.video_info().format, PixelFormat::RGB24);
        assert_eq!(fetch_frame(&unpacked, 0).unwrap().width(), 8);
    }

    #[test]
    fn invoke_failure_is_reported() {
        let mut registry = TestRegistry::default();
        plugin_init(&mut registry);

        let clip = Clip::new(vec![Frame::new(PixelFormat::YUV420P8, 8, 2)])
            .unwrap()
            .into_node();

        let err = registry.invoke("Pack", clip).err().unwrap();

        assert!(matches!(err, CreateError::UnsupportedFormat(_)));
    }
}
