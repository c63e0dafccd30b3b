mod strider;

pub(crate) use strider::Strider;
