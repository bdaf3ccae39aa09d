/// Logs through a [`Hades`](crate::Hades) entry point, converting each result
/// with [`Field::from`](crate::Field).
///
/// ```
/// use hades::{Hades, hlog};
///
/// let hades = Hades::builder().without_env().init_immediately(false).build().unwrap();
/// let err = std::io::Error::other("disk full");
/// hlog!(hades.warn("store", "flush", 3, "retries left", &err));
/// hlog!(hades.info_u("sync", "progress", format!("{}%", 40)));
/// ```
#[macro_export]
macro_rules! hlog {
    ($hades:ident . $method:ident ( $place:expr, $what:expr $(, $result:expr)* $(,)? )) => {
        $hades.$method($place, $what, &[$($crate::Field::from($result)),*])
    };
}
