use std::collections::HashSet;

use super::CatalogError;
use crate::engine::domain::{ConditionRule, FortuneDomain, RuleScope};

/// Feature names each extractor is known to produce.
const FACE_FEATURES: &[&str] = &[
    "印堂宽度比例",
    "印堂纹路数量",
    "印堂颜色亮度",
    "鼻梁高度",
    "鼻头圆润度",
    "鼻翼宽度",
    "额头高度比例",
    "额头饱满度",
    "眉眼距离比例",
    "眼尾平满度",
    "眼尾纹路数量",
    "泪堂饱满度",
    "眉毛浓密度",
    "眉毛距离比例",
    "天仓饱满度",
    "额角隆起度",
    "山根饱满度",
    "日月角高度",
    "下巴圆润度",
];

const PALM_FEATURES: &[&str] = &[
    "生命线长度比例",
    "生命线深度",
    "生命线弧度",
    "智慧线长度比例",
    "智慧线深度",
    "智慧线走向",
    "感情线长度比例",
    "感情线深度",
    "感情线分叉数量",
    "事业线长度比例",
    "事业线清晰度",
    "婚姻线数量",
    "婚姻线长度",
    "木星丘隆起度",
    "土星丘隆起度",
    "太阳丘隆起度",
    "水星丘隆起度",
    "金星丘隆起度",
    "金星丘面积比例",
    "太阴丘隆起度",
    "第一火星丘隆起度",
    "第二火星丘隆起度",
];

const ROOM_FEATURES: &[&str] = &[
    "朝向",
    "亮度",
    "色彩饱和度",
    "暖色比例",
    "冷色比例",
    "对比度",
    "整洁度",
    "空间开阔度",
    "自然光比例",
    "植物覆盖率",
    "纹理复杂度",
    "红色比例",
    "绿色比例",
    "木元素比例",
    "火元素比例",
    "土元素比例",
    "金元素比例",
    "水元素比例",
];

/// Per-domain allow-list of feature names rules may target.
///
/// Loading a catalog validates every rule against this registry so a typo in
/// a seeded row surfaces at load time instead of silently never matching.
#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    face: HashSet<String>,
    palm: HashSet<String>,
    room: HashSet<String>,
}

impl FeatureRegistry {
    /// Registry matching the production extractors.
    pub fn builtin() -> Self {
        FeatureRegistry {
            face: to_set(FACE_FEATURES),
            palm: to_set(PALM_FEATURES),
            room: to_set(ROOM_FEATURES),
        }
    }

    /// Registry built from explicit names, for catalogs of other extractors.
    pub fn from_names(
        domain: FortuneDomain,
        names: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut registry = FeatureRegistry {
            face: HashSet::new(),
            palm: HashSet::new(),
            room: HashSet::new(),
        };
        *registry.names_mut(domain) = names.into_iter().collect();
        registry
    }

    pub fn extend(&mut self, domain: FortuneDomain, names: impl IntoIterator<Item = String>) {
        self.names_mut(domain).extend(names);
    }

    pub fn knows(&self, domain: FortuneDomain, feature: &str) -> bool {
        self.names(domain).contains(feature)
    }

    /// Fail fast on rules targeting features no extractor produces.
    pub fn validate(
        &self,
        domain: FortuneDomain,
        rules: &[ConditionRule],
    ) -> Result<(), CatalogError> {
        for rule in rules {
            if !self.knows(domain, &rule.feature_name) {
                return Err(CatalogError::OrphanRule {
                    feature: rule.feature_name.clone(),
                    scope: match &rule.scope {
                        RuleScope::Group(group) => group.clone(),
                        RuleScope::AnyGroup => "*".to_string(),
                    },
                });
            }
        }
        Ok(())
    }

    fn names(&self, domain: FortuneDomain) -> &HashSet<String> {
        match domain {
            FortuneDomain::Face => &self.face,
            FortuneDomain::Palm => &self.palm,
            FortuneDomain::Room => &self.room,
        }
    }

    fn names_mut(&mut self, domain: FortuneDomain) -> &mut HashSet<String> {
        match domain {
            FortuneDomain::Face => &mut self.face,
            FortuneDomain::Palm => &mut self.palm,
            FortuneDomain::Room => &mut self.room,
        }
    }
}

fn to_set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}
