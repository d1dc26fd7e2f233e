//! 公园文档到视图模型的转换
//!
//! 地图页底部卡片和详情页都从同一份公园文档取值，字段回退规则集中在这里。

use serde::Serialize;
use serde_json::Value;

use crate::fields::FieldChain;
use crate::resolver::ImageUrlResolver;

const NAME: FieldChain = FieldChain::new(&["name"]);
const RATING: FieldChain = FieldChain::new(&["rating"]);
const CARD_IMAGE: FieldChain = FieldChain::new(&["image", "cover", "icon"]);
const CARD_TAGS: FieldChain = FieldChain::new(&["tags", "sceneTags"]);
const DETAIL_TAGS: FieldChain = FieldChain::new(&["tags"]);
const ADDRESS: FieldChain = FieldChain::new(&["address", "location"]);
const LATITUDE: FieldChain = FieldChain::new(&["latitude"]);
const LONGITUDE: FieldChain = FieldChain::new(&["longitude"]);
const REVIEW_COUNT: FieldChain = FieldChain::new(&["reviewCount"]);
const OPEN_TIME: FieldChain = FieldChain::new(&["openTime"]);
const PHONE: FieldChain = FieldChain::new(&["phone"]);
const PARK_TYPE: FieldChain = FieldChain::new(&["type"]);
const HECTARE: FieldChain = FieldChain::new(&["hectare"]);
const MANAGEMENT_UNIT: FieldChain = FieldChain::new(&["managementunit"]);
const COVER_IMAGE: FieldChain = FieldChain::new(&["coverImg"]);
const IMAGES: FieldChain = FieldChain::new(&["imgs"]);

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// 地图页底部卡片
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceCard {
    pub park_id: String,
    pub name: String,
    pub rating: f64,
    pub image: String,
    pub tags: Vec<String>,
    pub address: String,
    pub distance: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PlaceCard {
    /// 用数据库文档补全由地图标记生成的基础卡片
    pub fn from_document(doc: &Value, base: &PlaceCard) -> Self {
        Self {
            park_id: base.park_id.clone(),
            name: NAME.string_or(doc, &base.name),
            rating: RATING.number(doc).unwrap_or(base.rating),
            image: CARD_IMAGE.string_or(doc, &base.image),
            tags: CARD_TAGS.array(doc).unwrap_or_else(|| base.tags.clone()),
            address: ADDRESS.string_or(doc, &base.address),
            distance: base.distance.clone(),
            latitude: LATITUDE.present_number(doc).or(base.latitude),
            longitude: LONGITUDE.present_number(doc).or(base.longitude),
        }
    }

    /// 根据当前位置计算并填写距离
    pub fn with_distance_from(mut self, latitude: f64, longitude: f64) -> Self {
        self.distance = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => distance_meters(latitude, longitude, lat, lon)
                .map(format_distance)
                .unwrap_or_default(),
            _ => String::new(),
        };
        self
    }
}

/// 详情页标签
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceTag {
    pub icon: &'static str,
    pub text: String,
}

/// 详情页视图模型
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetail {
    pub id: String,
    pub name: String,
    pub rating: f64,
    pub review_count: String,
    pub tags: Vec<PlaceTag>,
    pub address: String,
    pub status: &'static str,
    pub hours: String,
    pub phone: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// 原始图片引用，展示前需要经过 [`ImageUrlResolver`] 解析
    pub images: Vec<String>,
}

impl PlaceDetail {
    pub fn from_document(id: &str, doc: &Value) -> Self {
        let name = NAME.string_or(doc, "未知公园");
        // 标签原样按逗号拆分，不去空白也不丢弃空项
        let raw_tags = DETAIL_TAGS.string(doc);
        let tags: Vec<&str> = raw_tags
            .as_deref()
            .map(|raw| raw.split(',').collect())
            .unwrap_or_default();

        Self {
            id: id.to_string(),
            rating: RATING.number(doc).unwrap_or(0.0),
            review_count: REVIEW_COUNT.string_or(doc, "0"),
            tags: tags
                .iter()
                .map(|tag| PlaceTag {
                    icon: tag_icon(tag),
                    text: tag.to_string(),
                })
                .collect(),
            address: ADDRESS.string_or(doc, ""),
            status: if doc.get("isOpen").and_then(Value::as_str) == Some("1") {
                "开放中"
            } else {
                "暂停开放"
            },
            hours: OPEN_TIME.string_or(doc, "未知"),
            phone: PHONE.string_or(doc, ""),
            description: describe(&name, doc, raw_tags.as_deref()),
            latitude: LATITUDE.present_number(doc),
            longitude: LONGITUDE.present_number(doc),
            images: image_refs(doc),
            name,
        }
    }

    /// 把图片引用解析为可展示的 URL，签发失败的图片保留原始引用
    pub async fn resolve_images(&self, resolver: &ImageUrlResolver) -> Vec<String> {
        resolver.resolve_many(&self.images).await
    }
}

/// 文档中的全部图片引用：封面在前，其余按原顺序，去掉空值
pub fn image_refs(doc: &Value) -> Vec<String> {
    let mut refs: Vec<String> = COVER_IMAGE.string(doc).into_iter().collect();
    refs.extend(IMAGES.string_list(doc).unwrap_or_default());
    refs
}

fn tag_icon(tag: &str) -> &'static str {
    const ICONS: &[(&str, &str)] = &[
        ("帐篷区", "⛺"),
        ("滨海休闲", "🌊"),
        ("儿童游乐", "🎠"),
        ("运动健身", "⚽"),
        ("观景", "🌄"),
        ("休闲", "☕"),
        ("文化", "📚"),
        ("自然", "🌿"),
    ];

    ICONS
        .iter()
        .find(|(keyword, _)| tag.contains(*keyword))
        .map_or("🏞️", |(_, icon)| *icon)
}

fn describe(name: &str, doc: &Value, tags: Option<&str>) -> String {
    let mut desc = format!("{}是一个{}", name, PARK_TYPE.string_or(doc, "公园"));

    if let Some(hectare) = HECTARE.number(doc) {
        desc.push_str(&format!("，占地面积约{hectare:.2}公顷"));
    }
    if let Some(unit) = MANAGEMENT_UNIT.string(doc) {
        desc.push_str(&format!("。由{unit}负责管理"));
    }
    if let Some(tags) = tags {
        desc.push_str(&format!("，特色包括：{tags}"));
    }
    if let Some(hours) = OPEN_TIME.string(doc) {
        desc.push_str(&format!("。开放时间：{hours}"));
    }

    desc.push('。');
    desc
}

/// 两个经纬度之间的球面距离（米），任一坐标不是有限数时返回 `None`
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Option<f64> {
    if ![lat1, lon1, lat2, lon2].iter().all(|v| v.is_finite()) {
        return None;
    }

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    Some(2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt()))
}

/// 1 公里以内显示为米，否则显示为保留一位小数的公里
pub fn format_distance(meters: f64) -> String {
    if !meters.is_finite() {
        return String::new();
    }
    if meters < 1000.0 {
        format!("{}m", meters.round())
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_card() -> PlaceCard {
        PlaceCard {
            park_id: "park-1".to_string(),
            name: "标记名称".to_string(),
            image: "/images/icons/park.png".to_string(),
            latitude: Some(22.543099),
            longitude: Some(114.057868),
            ..Default::default()
        }
    }

    #[test]
    fn test_place_card_prefers_document_fields() {
        let doc = json!({
            "name": "莲花山公园",
            "rating": 4.8,
            "cover": "images/lianhua.jpg",
            "sceneTags": ["观景", "休闲"],
            "location": "福田区红荔路6030号",
        });

        let card = PlaceCard::from_document(&doc, &base_card());
        assert_eq!(card.park_id, "park-1");
        assert_eq!(card.name, "莲花山公园");
        assert_eq!(card.rating, 4.8);
        assert_eq!(card.image, "images/lianhua.jpg");
        assert_eq!(card.tags, vec!["观景", "休闲"]);
        assert_eq!(card.address, "福田区红荔路6030号");
        assert_eq!(card.latitude, Some(22.543099));
    }

    #[test]
    fn test_place_card_falls_back_to_base() {
        let card = PlaceCard::from_document(&json!({ "name": "" }), &base_card());
        assert_eq!(card, base_card());
    }

    #[test]
    fn test_place_card_distance() {
        let card = base_card().with_distance_from(22.543099, 114.057868);
        assert_eq!(card.distance, "0m");

        let far = PlaceCard {
            latitude: Some(22.643099),
            ..base_card()
        }
        .with_distance_from(22.543099, 114.057868);
        assert_eq!(far.distance, "11.1km");

        let unknown = PlaceCard {
            latitude: None,
            ..base_card()
        }
        .with_distance_from(22.5, 114.0);
        assert_eq!(unknown.distance, "");
    }

    #[test]
    fn test_place_detail_from_document() {
        let doc = json!({
            "name": "深圳湾公园",
            "type": "滨海公园",
            "hectare": "108.5",
            "managementunit": "市公园管理中心",
            "tags": "滨海休闲,帐篷区,跑步",
            "isOpen": "1",
            "openTime": "全天",
            "coverImg": "images/cover.jpg",
            "imgs": ["images/1.jpg", "", "images/2.jpg"],
        });

        let detail = PlaceDetail::from_document("park-9", &doc);
        assert_eq!(detail.id, "park-9");
        assert_eq!(detail.status, "开放中");
        assert_eq!(detail.hours, "全天");
        assert_eq!(detail.review_count, "0");
        assert_eq!(
            detail.tags.iter().map(|t| t.icon).collect::<Vec<_>>(),
            vec!["🌊", "⛺", "🏞️"]
        );
        assert_eq!(
            detail.description,
            "深圳湾公园是一个滨海公园，占地面积约108.50公顷。由市公园管理中心负责管理，特色包括：滨海休闲,帐篷区,跑步。开放时间：全天。"
        );
        assert_eq!(
            detail.images,
            vec!["images/cover.jpg", "images/1.jpg", "images/2.jpg"]
        );
    }

    #[test]
    fn test_place_card_takes_array_tags_and_zero_coordinates() {
        let doc = json!({
            "tags": [],
            "sceneTags": ["观景"],
            "latitude": 0,
            "longitude": 0.0,
        });
        let card = PlaceCard::from_document(&doc, &base_card());
        assert!(card.tags.is_empty());
        assert_eq!(card.latitude, Some(0.0));
        assert_eq!(card.longitude, Some(0.0));

        // 字符串形式的标签不拆分，继续尝试 sceneTags
        let doc = json!({ "tags": "亲子,休闲", "sceneTags": ["观景"] });
        let card = PlaceCard::from_document(&doc, &base_card());
        assert_eq!(card.tags, vec!["观景"]);

        let base = PlaceCard {
            tags: vec!["标记标签".to_string()],
            ..base_card()
        };
        let card = PlaceCard::from_document(&json!({ "tags": "亲子" }), &base);
        assert_eq!(card.tags, vec!["标记标签"]);
    }

    #[test]
    fn test_place_detail_keeps_raw_tags() {
        let detail = PlaceDetail::from_document("x", &json!({ "name": "公园", "tags": "a, b,," }));
        assert_eq!(
            detail.tags.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(),
            vec!["a", " b", "", ""]
        );
        assert_eq!(detail.description, "公园是一个公园，特色包括：a, b,,。");
    }

    #[test]
    fn test_place_detail_defaults() {
        let detail = PlaceDetail::from_document("x", &json!({}));
        assert_eq!(detail.name, "未知公园");
        assert_eq!(detail.status, "暂停开放");
        assert_eq!(detail.hours, "未知");
        assert_eq!(detail.description, "未知公园是一个公园。");
        assert!(detail.images.is_empty());
    }

    #[test]
    fn test_distance_helpers() {
        assert_eq!(distance_meters(f64::NAN, 0.0, 0.0, 0.0), None);
        assert_eq!(format_distance(f64::NAN), "");
        assert_eq!(format_distance(999.4), "999m");
        assert_eq!(format_distance(1260.0), "1.3km");
    }
}
