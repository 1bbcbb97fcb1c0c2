pub mod waku {
    pub mod store {
        pub mod v2beta4 {
            include!("proto/gen/waku.store.v2beta4.rs");
        }
    }
}
